//! Modules
//!
//! The six module entry points (`zohobooks_account`, `zohobooks_account_info`,
//! and so on). Each one validates its arguments, resolves credentials, then
//! either reconciles one object (management modules) or queries a list
//! (info modules).

pub mod info;
pub mod invocation;
pub mod manage;
mod output;

pub use invocation::Invocation;
pub use output::{failure, ModuleOutput};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resource::{get_resource, ResourceDef};
use clap::ValueEnum;
use serde_json::{Map, Value};

/// Module selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModuleName {
    #[value(name = "zohobooks_account")]
    Account,
    #[value(name = "zohobooks_account_info")]
    AccountInfo,
    #[value(name = "zohobooks_item")]
    Item,
    #[value(name = "zohobooks_item_info")]
    ItemInfo,
    #[value(name = "zohobooks_vendor")]
    Vendor,
    #[value(name = "zohobooks_vendor_info")]
    VendorInfo,
}

impl ModuleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "zohobooks_account",
            Self::AccountInfo => "zohobooks_account_info",
            Self::Item => "zohobooks_item",
            Self::ItemInfo => "zohobooks_item_info",
            Self::Vendor => "zohobooks_vendor",
            Self::VendorInfo => "zohobooks_vendor_info",
        }
    }

    /// Registry key of the resource the module works on
    pub fn resource_key(&self) -> &'static str {
        match self {
            Self::Account | Self::AccountInfo => "account",
            Self::Item | Self::ItemInfo => "item",
            Self::Vendor | Self::VendorInfo => "vendor",
        }
    }

    pub fn is_info(&self) -> bool {
        matches!(self, Self::AccountInfo | Self::ItemInfo | Self::VendorInfo)
    }

    pub fn resource(&self) -> Result<&'static ResourceDef> {
        get_resource(self.resource_key())
            .ok_or_else(|| Error::config(format!("unknown resource '{}'", self.resource_key())))
    }
}

/// Execution flags taken from the invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Plan only, never mutate
    pub check_mode: bool,
    /// Report before/after of changed fields
    pub diff_mode: bool,
}

/// Run a module against raw (unvalidated) arguments
pub async fn run(
    module: ModuleName,
    args: &Map<String, Value>,
    config: &Config,
    options: RunOptions,
) -> Result<ModuleOutput> {
    let def = module.resource()?;
    tracing::debug!("Running {} (check_mode={})", module.as_str(), options.check_mode);

    if module.is_info() {
        info::run(def, args, config).await
    } else {
        manage::run(def, args, config, options).await
    }
}

//! Read magic file bundled in crate

use log::error;
use super::ruleset::RuleSet;

/// Load magic file before anything else.
lazy_static! {
    static ref ALLRULES: RuleSet = {
        RuleSet::from_u8(include_bytes!("magic")).unwrap_or_else(|e| {
            error!("bundled magic failed to compile: {}", e);
            RuleSet::default()
        })
    };
}

/// The bundled rules, compiled on first use.
pub fn rules() -> &'static RuleSet {
    &ALLRULES
}

pub mod init;
pub mod check;

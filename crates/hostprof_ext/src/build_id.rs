//! Build identifiers the host compares against its own before loading the
//! extension.

/// API number of the host's extension interface.
pub const EXTENSION_API_NO: u32 = 420230831;

/// API number of the host's module interface.
pub const MODULE_API_NO: u32 = 20230831;

#[cfg(not(feature = "zts"))]
const EXTENSION_BUILD_ID: &str = "API420230831,NTS";
#[cfg(feature = "zts")]
const EXTENSION_BUILD_ID: &str = "API420230831,TS";

#[cfg(not(feature = "zts"))]
const MODULE_BUILD_ID: &str = "API20230831,NTS";
#[cfg(feature = "zts")]
const MODULE_BUILD_ID: &str = "API20230831,TS";

pub fn extension_build_id() -> &'static str {
    EXTENSION_BUILD_ID
}

pub fn module_build_id() -> &'static str {
    MODULE_BUILD_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_embed_api_numbers() {
        assert!(extension_build_id().starts_with(&format!("API{EXTENSION_API_NO},")));
        assert!(module_build_id().starts_with(&format!("API{MODULE_API_NO},")));
        assert_eq!(extension_build_id(), extension_build_id());
    }
}

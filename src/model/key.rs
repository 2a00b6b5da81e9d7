//! Key Normalization
//!
//! Canonicalizes raw JSON field names into stable identifiers.

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Normalize a raw JSON key into a field identifier
///
/// Spaces and dots become underscores, then camel/Pascal case is converted
/// to snake case: `"Properties.ipAddress"` -> `"properties_ip_address"`.
/// Only alphanumeric runs are re-cased; every other character is kept, so
/// `"$schema"`, `"@odata.type"` and `"_etag"` stay distinct from their bare
/// names.
///
/// Distinct keys can normalize to the same identifier (`"fooBar"` and
/// `"foo_bar"`); model construction keeps the later one.
pub fn normalize_key(key: &str) -> String {
    map_runs(&key.replace([' ', '.'], "_"), char::is_alphanumeric, |run| {
        run.to_snake_case()
    })
}

/// Logical type name for a nested value stored under `key`
///
/// `"properties"` -> `"Properties"`, `"ipConfigurations"` -> `"IpConfigurations"`,
/// `"$schema"` -> `"$Schema"`, `"_etag"` -> `"_Etag"`
pub fn logical_name(key: &str) -> String {
    map_runs(
        &normalize_key(key),
        |c| c.is_alphanumeric() || c == '_',
        |run| {
            let body = run.trim_matches('_');
            if body.is_empty() {
                return run.to_string();
            }
            let lead = &run[..run.len() - run.trim_start_matches('_').len()];
            let trail = &run[run.trim_end_matches('_').len()..];
            format!("{}{}{}", lead, body.to_upper_camel_case(), trail)
        },
    )
}

/// Apply `convert` to each maximal run of characters matching `in_run`,
/// copying all other characters through unchanged
fn map_runs(
    input: &str,
    in_run: impl Fn(char) -> bool,
    convert: impl Fn(&str) -> String,
) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut start = None;

    for (i, c) in input.char_indices() {
        match (in_run(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push_str(&convert(&input[s..i]));
                out.push(c);
                start = None;
            }
            (false, None) => out.push(c),
            (true, Some(_)) => {}
        }
    }
    if let Some(s) = start {
        out.push_str(&convert(&input[s..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_dots_and_spaces() {
        assert_eq!(normalize_key("Properties.ipAddress"), "properties_ip_address");
        assert_eq!(normalize_key("foo bar"), "foo_bar");
        assert_eq!(normalize_key("FooBar"), "foo_bar");
    }

    #[test]
    fn test_normalize_common_arm_keys() {
        assert_eq!(normalize_key("id"), "id");
        assert_eq!(normalize_key("provisioningState"), "provisioning_state");
        assert_eq!(normalize_key("hardwareProfile"), "hardware_profile");
        assert_eq!(normalize_key("vmSize"), "vm_size");
        assert_eq!(normalize_key("key1"), "key1");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for key in ["Properties.ipAddress", "foo bar", "FooBar", "HTTPSEnabled", "osDisk.vhd"] {
            let once = normalize_key(key);
            assert_eq!(normalize_key(&once), once, "not idempotent for {key}");
        }
    }

    #[test]
    fn test_logical_name() {
        assert_eq!(logical_name("properties"), "Properties");
        assert_eq!(logical_name("ipConfigurations"), "IpConfigurations");
        assert_eq!(logical_name("hardware_profile"), "HardwareProfile");
    }

    #[test]
    fn test_normalize_keeps_sigils_and_underscores() {
        assert_eq!(normalize_key("$schema"), "$schema");
        assert_eq!(normalize_key("contentVersion"), "content_version");
        assert_eq!(normalize_key("@odata.type"), "@odata_type");
        assert_eq!(normalize_key("_etag"), "_etag");
        assert_eq!(normalize_key("foo__bar"), "foo__bar");
        assert_eq!(normalize_key("x-ms-version"), "x-ms-version");
        assert_eq!(normalize_key("urn:ietf:Params"), "urn:ietf:params");
        assert_eq!(normalize_key("Microsoft.Compute/virtualMachines"), "microsoft_compute/virtual_machines");
    }

    #[test]
    fn test_sigil_keys_stay_distinct() {
        assert_ne!(normalize_key("$schema"), normalize_key("schema"));
        assert_ne!(normalize_key("_etag"), normalize_key("etag"));
        assert_ne!(logical_name("$schema"), logical_name("schema"));
    }

    #[test]
    fn test_normalize_sigil_keys_is_idempotent() {
        for key in ["$schema", "@odata.type", "_etag", "foo__bar", "x-ms-Request-ID", "a1B"] {
            let once = normalize_key(key);
            assert_eq!(normalize_key(&once), once, "not idempotent for {key}");
        }
    }

    #[test]
    fn test_logical_name_keeps_sigils() {
        assert_eq!(logical_name("$schema"), "$Schema");
        assert_eq!(logical_name("@odata.type"), "@OdataType");
        assert_eq!(logical_name("_etag"), "_Etag");
        assert_ne!(logical_name("_etag"), logical_name("etag"));
    }
}

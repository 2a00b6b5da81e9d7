//! Integration tests for mapping Resource Manager payloads
//!
//! These tests run realistic payloads through catalog types and check the
//! documented mapping behavior end to end.

use armrest_model::{
    CacheState, Catalog, Field, Model, ModelError, ModelType, ShapePolicy, StorageAccountKey,
};
use serde_json::{json, Value};
use std::sync::Arc;

const VM_ID: &str =
    "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";

fn catalog() -> Catalog {
    Catalog::embedded().expect("embedded catalog should load")
}

fn vm_payload() -> Value {
    json!({
        "id": VM_ID,
        "name": "vm1",
        "location": "eastus",
        "tags": {"env": "prod", "costCenter": "42"},
        "properties": {
            "vmId": "7f3c1d2e",
            "hardwareProfile": {"vmSize": "Standard_D2s_v3"},
            "storageProfile": {
                "osDisk": {"osType": "Linux", "name": "vm1-os"},
                "dataDisks": [
                    {"lun": 0, "name": "data0", "diskSizeGB": 128},
                    {"lun": 1, "name": "data1", "diskSizeGB": 256}
                ]
            },
            "networkProfile": {
                "networkInterfaces": [{"id": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/networkInterfaces/nic1"}]
            },
            "provisioningState": "Succeeded"
        }
    })
}

fn model(field: &Field) -> &Model {
    field.as_model().expect("field should be a promoted model")
}

mod construction_tests {
    use super::*;

    /// Nested objects become models of synthesized nested types
    #[test]
    fn test_virtual_machine_nested_promotion() {
        let catalog = catalog();
        let vm_type = catalog.require("VirtualMachine").unwrap();
        let vm = Model::new(vm_type, vm_payload()).unwrap();

        let properties = model(vm.read("properties").unwrap());
        assert_eq!(properties.type_name(), "VirtualMachine::Properties");

        let hardware = model(properties.read("hardwareProfile").unwrap());
        assert_eq!(hardware.type_name(), "VirtualMachine::Properties::HardwareProfile");
        assert_eq!(hardware.read("vm_size").unwrap().as_str(), Some("Standard_D2s_v3"));

        let disks = model(properties.read("storage_profile").unwrap())
            .read("data_disks")
            .unwrap()
            .as_list()
            .unwrap();
        assert_eq!(disks.len(), 2);
        assert_eq!(model(&disks[1]).read("disk_size_gb").unwrap().as_value(), Some(&json!(256)));
    }

    /// The Hoth payload reads and serializes back with normalized keys
    #[test]
    fn test_round_trip() {
        let catalog = catalog();
        let host = Model::new(
            catalog.base(),
            json!({"name": "Hoth", "Properties": {"ipAddress": "123.123.123.123"}}),
        )
        .unwrap();

        assert_eq!(
            model(host.read("properties").unwrap())
                .read("ip_address")
                .unwrap()
                .as_str(),
            Some("123.123.123.123")
        );
        assert_eq!(
            host.to_value(),
            json!({"name": "Hoth", "properties": {"ip_address": "123.123.123.123"}})
        );
    }

    /// Excluded fields keep their raw value and original keys
    #[test]
    fn test_tags_are_not_promoted() {
        let catalog = catalog();
        let vm = Model::new(catalog.require("VirtualMachine").unwrap(), vm_payload()).unwrap();

        let tags = vm.read("tags").unwrap();
        assert_eq!(tags.as_value(), Some(&json!({"env": "prod", "costCenter": "42"})));
        assert!(tags.as_model().is_none());
        assert_eq!(vm.to_value()["tags"], json!({"env": "prod", "costCenter": "42"}));
    }

    /// List responses map to one model per item
    #[test]
    fn test_collection_of_subnets() {
        let catalog = catalog();
        let subnet_type = catalog.require("Network::Subnet").unwrap();
        let subnets = Model::collection(
            subnet_type,
            json!({"value": [
                {"id": "/subscriptions/s/resourceGroups/net-rg/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/default", "name": "default"},
                {"id": "/subscriptions/s/resourceGroups/net-rg/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/backend", "name": "backend"}
            ]}),
        )
        .unwrap();

        assert_eq!(subnets.len(), 2);
        assert!(subnets.iter().all(|s| s.type_name() == "Network::Subnet"));
        assert_eq!(subnets[1].derived("virtual_network"), Some("vnet1"));
        assert_eq!(subnets[1].resource_group(), Some("net-rg"));
    }

    #[test]
    fn test_collection_rejects_scalars() {
        let catalog = catalog();
        let err = Model::collection(catalog.base(), json!("nope")).unwrap_err();
        assert!(matches!(err, ModelError::NotACollection { found: "string", .. }));
    }

    #[test]
    fn test_from_json_str() {
        let catalog = catalog();
        let location = Model::from_json_str(
            catalog.require("Location").unwrap(),
            r#"{"name": "eastus", "displayName": "East US", "regionalDisplayName": "(US) East US"}"#,
        )
        .unwrap();
        assert_eq!(location.read("display_name").unwrap().as_str(), Some("East US"));

        let err = Model::from_json_str(catalog.base(), "{not json").unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }
}

mod derived_attribute_tests {
    use super::*;

    #[test]
    fn test_identifier_segments() {
        let catalog = catalog();
        let vm = Model::new(catalog.require("VirtualMachine").unwrap(), vm_payload()).unwrap();
        assert_eq!(vm.subscription_id(), Some("sub1"));
        assert_eq!(vm.resource_group(), Some("rg1"));
    }

    /// Identifiers without a resource group segment yield no value
    #[test]
    fn test_missing_segment_yields_no_value() {
        let catalog = catalog();
        let sub = Model::new(
            catalog.require("Subscription").unwrap(),
            json!({"id": "/subscriptions/sub1", "displayName": "Dev"}),
        )
        .unwrap();

        assert_eq!(sub.resource_group(), None);
        assert_eq!(sub.resource_group(), None);
        assert_eq!(
            sub.derived_cell("resource_group").unwrap().state(),
            CacheState::NoValue
        );
        assert_eq!(sub.subscription_id(), Some("sub1"));
    }

    #[test]
    fn test_absent_identifier_yields_no_value() {
        let catalog = catalog();
        let sku = Model::new(catalog.require("Sku").unwrap(), json!({"name": "Standard_LRS"})).unwrap();
        assert_eq!(sku.subscription_id(), None);
        assert_eq!(sku.resource_group(), None);
    }

    #[test]
    fn test_storage_account_keys() {
        let catalog = catalog();
        let keys = Model::collection(
            catalog.require("StorageAccountKey").unwrap(),
            json!([{"keyName": "key2", "value": "c2VjcmV0", "permissions": "Full"}]),
        )
        .unwrap();

        let key = StorageAccountKey::new(&keys[0]);
        assert_eq!(key.key2(), Some("c2VjcmV0"));
        assert_eq!(key.key(), Some("c2VjcmV0"));
        assert_eq!(key.key1(), None);
    }
}

mod reuse_policy_tests {
    use super::*;

    /// Nested types are reused by name; unknown fields fail loudly by default
    #[test]
    fn test_reused_nested_type_rejects_new_fields() {
        let catalog = catalog();
        let ty = catalog.require("Resource").unwrap();

        Model::new(ty, json!({"sku": {"a": 1}})).unwrap();
        let err = Model::new(ty, json!({"sku": {"a": 1, "b": 2}})).unwrap_err();

        match err {
            ModelError::ShapeMismatch { type_name, fields } => {
                assert_eq!(type_name, "Resource::Sku");
                assert_eq!(fields, vec!["b".to_string()]);
            }
            other => panic!("expected ShapeMismatch, got {other}"),
        }
    }

    /// Heterogeneous list items fail on the first unknown field
    #[test]
    fn test_heterogeneous_list_items() {
        let catalog = catalog();
        let ty = catalog.require("Network::NetworkInterface").unwrap();
        let result = Model::new(
            ty,
            json!({"properties": {"ipConfigurations": [
                {"name": "ipconfig1", "privateIPAddress": "10.0.0.4"},
                {"name": "ipconfig2", "publicIPAddress": {"id": "pip"}}
            ]}}),
        );
        assert!(matches!(result, Err(ModelError::ShapeMismatch { .. })));
    }

    /// An extending subtype widens the reused type instead
    #[test]
    fn test_extend_policy() {
        let catalog = catalog();
        let ty = ModelType::builder("Resource")
            .extends(catalog.require("Resource").unwrap())
            .shape_policy(ShapePolicy::Extend)
            .build();

        let first = Model::new(&ty, json!({"sku": {"a": 1}})).unwrap();
        let second = Model::new(&ty, json!({"sku": {"a": 1, "b": 2}})).unwrap();

        let first_sku = model(first.read("sku").unwrap());
        let second_sku = model(second.read("sku").unwrap());
        assert!(Arc::ptr_eq(first_sku.model_type(), second_sku.model_type()));
        assert_eq!(second_sku.read("b").unwrap().as_value(), Some(&json!(2)));
        assert!(first_sku.read("b").unwrap().is_null());
    }

    #[test]
    fn test_unknown_field_on_strict_and_lenient_types() {
        let catalog = catalog();
        let strict = Model::new(catalog.require("Tenant").unwrap(), json!({"tenantId": "t"})).unwrap();
        assert!(matches!(
            strict.read("displayName"),
            Err(ModelError::UnknownField { .. })
        ));

        let lenient = Model::new(catalog.require("ResponseBody").unwrap(), json!({})).unwrap();
        assert!(lenient.read("anything").unwrap().is_null());
    }
}

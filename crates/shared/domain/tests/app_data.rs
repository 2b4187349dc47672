use farm_domain::app_data::{AppDataKey, SharedAppData};
use farm_domain::modules::ModuleCapabilities;
use farm_domain::records::{Sale, TransactionKind};
use serde_json::json;

#[test]
fn snapshot_uses_camel_case_keys() {
    let value = serde_json::to_value(SharedAppData::default()).expect("serialize");
    for key in AppDataKey::ALL {
        assert!(value.get(key.as_str()).is_some(), "missing {key}");
    }
}

#[test]
fn partial_snapshot_fills_defaults_and_ignores_unknown_fields() {
    let raw = json!({
        "sales": [{ "id": "s1", "product": "eggs", "quantity": 30, "unitPrice": 0.5, "legacy": true }],
        "transactions": [{ "id": "t1", "type": "income", "amount": 15 }],
        "somethingElse": 1
    });

    let data: SharedAppData = serde_json::from_value(raw).expect("deserialize");
    assert_eq!(data.sales.len(), 1);
    assert!((data.sales[0].total() - 15.0).abs() < f64::EPSILON);
    assert_eq!(data.transactions[0].kind, TransactionKind::Income);
    assert_eq!(data.settings.currency, "USD");
    assert!(!data.profile.is_complete());
}

#[test]
fn keys_parse_and_report_collections() {
    assert_eq!("feedRecords".parse::<AppDataKey>(), Ok(AppDataKey::FeedRecords));
    assert!("feed_records".parse::<AppDataKey>().is_err());

    let data = SharedAppData {
        sales: vec![Sale::default(), Sale::default()],
        ..SharedAppData::default()
    };
    assert_eq!(data.collection_len(AppDataKey::Sales), Some(2));
    assert_eq!(data.collection_len(AppDataKey::Profile), None);
    assert!(!AppDataKey::Settings.is_collection());
    assert_eq!(AppDataKey::Sales.legacy_storage_key(), "salesRecords");
}

#[test]
fn capabilities_require_template_or_initialize() {
    assert!(!ModuleCapabilities::AUTH.is_usable());
    assert!((ModuleCapabilities::AUTH | ModuleCapabilities::TEMPLATE).is_usable());
    assert!(ModuleCapabilities::INITIALIZE.is_usable());
}

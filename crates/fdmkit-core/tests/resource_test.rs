//! Typed resources and named operations against the in-memory appliance.

mod common;

use common::{FakeAppliance, NETWORKS, RADIUS, SI_POLICIES, host, object};
use fdmkit_core::models::{NetworkObject, RadiusIdentitySource, SecurityIntelligenceNetworkPolicy};
use fdmkit_core::{
    ConfigResource, HttpMethod, ListParams, OperationRegistry, Params, ReconcileError,
    Reconciler, ResourceClient, ResourceOperation, run_operation,
};
use serde_json::{Value, json};

#[tokio::test]
async fn typed_add_is_idempotent() {
    let appliance = FakeAppliance::new();
    let web = NetworkObject::host("web", "10.0.0.1");

    let mut client = ResourceClient::<NetworkObject, _>::new(&appliance);
    let created = client.add(&web).await.unwrap();
    assert!(created.id.is_some());
    assert!(client.config_changed());

    let mut again = ResourceClient::<NetworkObject, _>::new(&appliance);
    let existing = again.add(&web).await.unwrap();
    assert_eq!(existing.id, created.id);
    assert!(!again.config_changed());
}

#[tokio::test]
async fn typed_get_list_and_get_by_name() {
    let appliance = FakeAppliance::new();
    appliance.seed_many(NETWORKS, "net", 12);
    let id = appliance.seed(NETWORKS, Value::Object(host("web", "10.0.0.1")));

    let client = ResourceClient::<NetworkObject, _>::new(&appliance);

    let all = client.list(ListParams::new()).await.unwrap();
    assert_eq!(all.len(), 13);

    let fetched = client.get(&id).await.unwrap();
    assert_eq!(fetched.value, "10.0.0.1");

    let by_name = client.get_by_name("web").await.unwrap().unwrap();
    assert_eq!(by_name.id.as_deref(), Some(id.as_str()));
    assert!(client.get_by_name("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn typed_edit_requires_id() {
    let appliance = FakeAppliance::new();
    let mut client = ResourceClient::<NetworkObject, _>::new(&appliance);

    let err = client
        .edit(&NetworkObject::host("web", "10.0.0.1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert!(appliance.calls().is_empty());
}

#[tokio::test]
async fn typed_edit_and_delete() {
    let appliance = FakeAppliance::new();
    let mut client = ResourceClient::<RadiusIdentitySource, _>::new(&appliance);

    let source = RadiusIdentitySource::new("radius", "10.1.1.1")
        .with_secret_key("s3cret")
        .with_port(1812);
    let mut created = client.add(&source).await.unwrap();

    created.timeout = Some(10);
    let edited = client.edit(&created).await.unwrap();
    assert_eq!(edited.timeout, Some(10));
    assert_eq!(appliance.objects(RADIUS)[0]["timeout"], 10);

    let id = edited.id.unwrap();
    assert!(client.delete(&id).await.unwrap().is_deleted());
    assert!(!client.delete(&id).await.unwrap().is_deleted());
}

#[tokio::test]
async fn typed_upsert_edit_by_name_and_delete_by_name() {
    let appliance = FakeAppliance::new();
    appliance.seed(NETWORKS, Value::Object(host("web", "10.0.0.1")));
    let mut client = ResourceClient::<NetworkObject, _>::new(&appliance);

    let upserted = client
        .upsert(&NetworkObject::host("web", "10.0.0.2"))
        .await
        .unwrap();
    assert_eq!(upserted.value, "10.0.0.2");

    let edited = client
        .edit_by_name(&NetworkObject::host("web", "10.0.0.3").with_description("frontend"))
        .await
        .unwrap();
    assert_eq!(edited.description.as_deref(), Some("frontend"));

    client.delete_by_name("web").await.unwrap();
    assert!(appliance.objects(NETWORKS).is_empty());
}

#[tokio::test]
async fn unsupported_operations_are_rejected_before_any_call() {
    let appliance = FakeAppliance::new();
    let mut client = ResourceClient::<SecurityIntelligenceNetworkPolicy, _>::new(&appliance);

    let err = client
        .add(&SecurityIntelligenceNetworkPolicy::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReconcileError::UnsupportedOperation(ref op) if op == "addSecurityIntelligenceNetworkPolicy")
    );

    let err = client
        .execute(ResourceOperation::DeleteByName, &object(json!({"name": "x"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::UnsupportedOperation(_)));
    assert!(appliance.calls().is_empty());
}

#[tokio::test]
async fn policy_can_be_edited_by_name() {
    let appliance = FakeAppliance::new();
    appliance.seed(
        SI_POLICIES,
        json!({"name": "Default-SI", "type": "securityintelligencenetworkpolicy"}),
    );
    let mut client = ResourceClient::<SecurityIntelligenceNetworkPolicy, _>::new(&appliance);

    let mut policy = client.get_by_name("Default-SI").await.unwrap().unwrap();
    policy.blacklist_for_block = vec![
        fdmkit_core::models::ReferenceModel::new("feed-1", "networkfeed").with_name("tor"),
    ];
    client.edit(&policy).await.unwrap();

    let stored = appliance.object_named(SI_POLICIES, "Default-SI").unwrap();
    assert_eq!(stored["blacklistForBlock"][0]["id"], "feed-1");
    assert!(client.config_changed());
}

#[tokio::test]
async fn execute_dispatches_untyped_operations() {
    let appliance = FakeAppliance::new();
    let mut client = ResourceClient::<NetworkObject, _>::new(&appliance);

    let op = ResourceOperation::parse("addNetworkObject", NetworkObject::TYPE_NAME).unwrap();
    let created = client
        .execute(op, &object(json!({"data": host("web", "10.0.0.1")})))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let listed = client
        .execute(ResourceOperation::GetList, &object(json!({"limit": 5})))
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let fetched = client
        .execute(ResourceOperation::Get, &object(json!({"objId": id})))
        .await
        .unwrap();
    assert_eq!(fetched["name"], "web");

    let deleted = client
        .execute(ResourceOperation::DeleteByName, &object(json!({"name": "web"})))
        .await
        .unwrap();
    assert_eq!(deleted, json!({}));

    let err = client
        .execute(ResourceOperation::Edit, &object(json!({"data": host("web", "1")})))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Validation(_)));
}

#[tokio::test]
async fn run_operation_applies_reconciliation_by_kind() {
    let appliance = FakeAppliance::new();
    let registry = OperationRegistry::with_builtin_resources();
    let none = Params::new();

    let mut reconciler = Reconciler::new(&appliance);
    let add = registry.get("addNetworkObject").unwrap();
    let created = run_operation(
        &mut reconciler,
        "addNetworkObject",
        add,
        Some(host("web", "10.0.0.1")),
        &none,
        &none,
    )
    .await
    .unwrap();
    run_operation(
        &mut reconciler,
        "addNetworkObject",
        add,
        Some(host("web", "10.0.0.1")),
        &none,
        &none,
    )
    .await
    .unwrap();
    assert_eq!(appliance.calls_with(HttpMethod::Post), 1);

    let id_params = Params::from([(
        "objId".to_string(),
        created["id"].as_str().unwrap().to_string(),
    )]);
    let list = registry.get("getNetworkObjectList").unwrap();
    let page = run_operation(&mut reconciler, "getNetworkObjectList", list, None, &none, &none)
        .await
        .unwrap();
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let delete = registry.get("deleteNetworkObject").unwrap();
    run_operation(&mut reconciler, "deleteNetworkObject", delete, None, &id_params, &none)
        .await
        .unwrap();
    let absent = run_operation(&mut reconciler, "deleteNetworkObject", delete, None, &id_params, &none)
        .await
        .unwrap();
    assert_eq!(absent, json!({"response": "Referenced object does not exist"}));

    let edit = registry.get("editNetworkObject").unwrap();
    let err = run_operation(&mut reconciler, "editNetworkObject", edit, None, &id_params, &none)
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Validation(_)));
}

#[test]
fn unknown_operation_names_are_unsupported() {
    let registry = OperationRegistry::with_builtin_resources();
    let err = registry.get("addUnicorn").unwrap_err();
    assert!(matches!(err, ReconcileError::UnsupportedOperation(_)));
}

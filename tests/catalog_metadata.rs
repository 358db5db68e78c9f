mod common;

use common::{Fixture, extension};
use delta_classic::host::AttachmentHost;
use delta_classic::host::memory::MemoryHost;
use delta_classic::reader::delta_log::DeltaLogReader;
use delta_classic::{AttachOptions, Config, Extension, Layout};
use std::sync::Arc;

#[test]
fn database_listing_reports_every_attachment() {
    let fixture = Fixture::new();
    let (ext, _host) = extension();
    ext.attach("sdb", &fixture.single_schema(), AttachOptions { pin_snapshot: true }).unwrap();
    ext.attach("mdb", &fixture.multi_schema(), AttachOptions::default()).unwrap();

    let databases = ext.databases();
    assert_eq!(databases.len(), 2);

    let mdb = &databases[0];
    assert_eq!(mdb.database_name, "mdb");
    assert_eq!(mdb.layout, Layout::MultiSchema);
    assert_eq!((mdb.schema_count, mdb.table_count), (2, 3));
    assert!(!mdb.pin_snapshot);

    let sdb = &databases[1];
    assert_eq!(sdb.layout, Layout::SingleSchema);
    assert_eq!((sdb.schema_count, sdb.table_count), (1, 2));
    assert!(sdb.pin_snapshot && sdb.readonly);

    let all_tables = ext.tables(None).unwrap();
    assert_eq!(all_tables.len(), 5);
}

#[test]
fn internal_attachments_never_show_up_as_databases() {
    let fixture = Fixture::new();
    let (ext, host) = extension();
    ext.attach("sdb", &fixture.single_schema(), AttachOptions::default()).unwrap();
    ext.bind_table("sdb", "main", "table_a").unwrap();
    ext.bind_table("sdb", "main", "table_b").unwrap();

    assert_eq!(host.len(), 2);
    let names: Vec<String> = ext.databases().into_iter().map(|d| d.database_name).collect();
    assert_eq!(names, vec!["sdb"]);
}

#[test]
fn listings_serialize_to_json() {
    let fixture = Fixture::new();
    let (ext, _host) = extension();
    ext.attach("sdb", &fixture.single_schema(), AttachOptions::default()).unwrap();

    let rows = serde_json::to_value(ext.tables(Some("sdb")).unwrap()).unwrap();
    assert_eq!(rows[0]["table_name"], "table_a");
    assert_eq!(rows[1]["schema_name"], "main");

    let stats = serde_json::to_value(ext.stats()).unwrap();
    assert_eq!(stats["attached_databases"], 1);
    assert_eq!(stats["discovered_tables"], 2);
}

#[test]
fn stats_and_health_follow_the_lifecycle() {
    let fixture = Fixture::new();
    let (ext, host) = extension();
    ext.attach("sdb", &fixture.single_schema(), AttachOptions::default()).unwrap();
    ext.bind_table("sdb", "main", "table_a").unwrap();

    let stats = ext.stats();
    assert_eq!(stats.attaches, 1);
    assert_eq!(stats.materialized_tables, 1);
    assert_eq!(stats.internal_attachments.created, 1);
    assert_eq!(stats.internal_attachments.live, 1);
    assert_eq!(stats.bindings, 1);
    assert!(ext.health_check().status.is_healthy());

    // Something left behind under the reserved prefix is reported
    let stray = ext.database("sdb").unwrap().table("main", "table_b").unwrap().physical_path().to_path_buf();
    let snapshot = ext.bind_table("sdb", "main", "table_b").unwrap().snapshot.as_ref().clone();
    host.attach(&delta_classic::host::InternalAttachment {
        name: "__dc_gone_0_main_t".to_string(),
        table_path: stray,
        pin_snapshot: false,
        snapshot,
    }).unwrap();
    assert_eq!(ext.orphaned_attachments(), vec!["__dc_gone_0_main_t".to_string()]);
    assert!(!ext.health_check().status.is_healthy());

    ext.detach("sdb").unwrap();
    let stats = ext.stats();
    assert_eq!(stats.detaches, 1);
    assert_eq!(stats.internal_attachments.removed, 2);
    assert_eq!(stats.internal_attachments.live, 1);
}

#[test]
fn config_file_overrides_defaults() {
    let fixture = Fixture::new();
    let config_path = fixture.path("delta_classic.json");
    std::fs::write(&config_path, r#"{"default_schema": "public"}"#).unwrap();

    let config = Config::from_json_file(&config_path).unwrap();
    assert_eq!(config.default_schema, "public");
    assert_eq!(config.log_dir_name, "_delta_log");

    let host = Arc::new(MemoryHost::new());
    let ext = Extension::new(config, Arc::new(DeltaLogReader::default()), host);
    ext.attach("sdb", &fixture.single_schema(), AttachOptions::default()).unwrap();
    assert_eq!(ext.bind_table("sdb", "public", "table_a").unwrap().schema, "public");
}

#[test]
fn dropping_the_extension_detaches_everything() {
    let fixture = Fixture::new();
    let host = Arc::new(MemoryHost::new());
    {
        let ext = Extension::with_host(host.clone());
        ext.attach("sdb", &fixture.single_schema(), AttachOptions::default()).unwrap();
        ext.attach("mdb", &fixture.multi_schema(), AttachOptions::default()).unwrap();
        ext.bind_table("sdb", "main", "table_a").unwrap();
        ext.bind_table("mdb", "schema2", "table_z").unwrap();
        assert_eq!(host.len(), 2);
    }
    assert!(host.is_empty());
    assert!(host.attachment_names().is_empty());
}

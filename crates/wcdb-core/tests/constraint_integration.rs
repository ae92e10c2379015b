//! Integration tests for column constraints, from DDL to the write path.

use wcdb_core::constraint::codec;
use wcdb_core::{
    ColumnIdentifier, ColumnMetadata, ColumnType, ConstraintConfig, ConstraintEnforcer,
    ConstraintError, DecodeError, DefinitionError, Error, TableMetadata,
};
use wcdb_proto::Version;

struct TestContext {
    table: TableMetadata,
    config: ConstraintConfig,
}

impl TestContext {
    fn new(table: TableMetadata) -> Self {
        let config = ConstraintConfig::default();
        table.validate_constraints(&config).unwrap();
        Self { table, config }
    }

    fn enforcer(&self) -> ConstraintEnforcer<'_> {
        ConstraintEnforcer::new(&self.table, &self.config)
    }
}

fn int(value: i32) -> Vec<u8> {
    ColumnType::Int.from_string(&value.to_string()).unwrap()
}

fn id(name: &str) -> ColumnIdentifier {
    ColumnIdentifier::from_cql(name)
}

fn scores_table() -> TableMetadata {
    TableMetadata::new("ks", "scores")
        .with_column(ColumnMetadata::partition_key("pk", ColumnType::Int))
        .with_column(ColumnMetadata::clustering("ck", ColumnType::Int))
        .with_column(ColumnMetadata::regular("col", ColumnType::Int))
        .with_column(ColumnMetadata::regular("label", ColumnType::Text))
        .with_check("col", "col > 5")
        .unwrap()
        .with_check("label", "NOT_NULL(label) AND LENGTH(label) < 8")
        .unwrap()
}

#[test]
fn test_scalar_constraint_on_insert() {
    let ctx = TestContext::new(scores_table());
    let (pk, ck, label) = (int(1), int(1), b"ok".to_vec());

    let six = int(6);
    assert!(ctx
        .enforcer()
        .check_insert(&[
            (id("pk"), pk.as_slice()),
            (id("ck"), ck.as_slice()),
            (id("col"), six.as_slice()),
            (id("label"), label.as_slice()),
        ])
        .is_ok());

    let three = int(3);
    let err = ctx
        .enforcer()
        .check_insert(&[
            (id("pk"), pk.as_slice()),
            (id("ck"), ck.as_slice()),
            (id("col"), three.as_slice()),
            (id("label"), label.as_slice()),
        ])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Column value does not satisfy value constraint for column 'col'. It should be col > 5"
    );
}

#[test]
fn test_not_null_on_regular_column() {
    let ctx = TestContext::new(scores_table());
    let (pk, ck) = (int(1), int(2));

    let err = ctx
        .enforcer()
        .check_insert(&[(id("pk"), pk.as_slice()), (id("ck"), ck.as_slice())])
        .unwrap_err();
    assert_eq!(
        err,
        ConstraintError::MissingColumn {
            column: id("label")
        }
    );
    assert_eq!(
        err.to_string(),
        "Column 'label' has to be specified as part of this query."
    );

    let null: &[u8] = &[];
    let err = ctx
        .enforcer()
        .check_insert(&[
            (id("pk"), pk.as_slice()),
            (id("ck"), ck.as_slice()),
            (id("label"), null),
        ])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Column value does not satisfy value constraint for column 'label' as it is null."
    );

    let long = b"much too long".to_vec();
    let err = ctx
        .enforcer()
        .check_update(&[(id("label"), long.as_slice())])
        .unwrap_err();
    assert!(err.to_string().ends_with("It should be LENGTH(label) < 8"));

    assert_eq!(
        ctx.enforcer()
            .check_column_deletion(&id("label"))
            .unwrap_err()
            .to_string(),
        "Column 'label' can not be set to null."
    );
}

#[test]
fn test_not_null_on_key_columns_is_rejected() {
    let config = ConstraintConfig::default();

    let err = scores_table()
        .with_check("pk", "NOT_NULL(pk)")
        .unwrap()
        .validate_constraints(&config)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "NOT_NULL constraint can not be specified on a partition key column 'pk'"
    );

    let err = scores_table()
        .with_check("ck", "not_null(ck)")
        .unwrap()
        .validate_constraints(&config)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "NOT_NULL constraint can not be specified on a clustering key column 'ck'"
    );
}

#[test]
fn test_definition_errors() {
    let config = ConstraintConfig::default();

    let err = scores_table()
        .with_check("label", "label > 5")
        .unwrap()
        .validate_constraints(&config)
        .unwrap_err();
    assert_eq!(err.to_string(), "Column 'label' is not a number type.");

    let err = scores_table()
        .with_check("col", "NOT_NULL(label)")
        .unwrap()
        .validate_constraints(&config)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parameter of NOT_NULL constraint should be the column name (col)"
    );

    let err = scores_table().with_check("col", "IS_POSITIVE(col)").unwrap_err();
    assert_eq!(err, DefinitionError::UnrecognizedFunction("IS_POSITIVE".into()));

    let err = scores_table().with_check("col", "col >").unwrap_err();
    assert!(matches!(err, DefinitionError::Syntax(_)));
}

#[test]
fn test_snapshot_round_trip() {
    let config = ConstraintConfig::default().with_metadata_version(Version::V1);
    let table = scores_table();

    let bytes = table.persist(&config).unwrap();
    let restored = TableMetadata::from_snapshot_bytes(&bytes).unwrap();
    assert_eq!(restored, table);
    assert_eq!(restored.to_cql(), table.to_cql());

    restored.validate_constraints(&config).unwrap();
    let three = int(3);
    let enforcer = ConstraintEnforcer::new(&restored, &config);
    assert!(enforcer.check_update(&[(id("col"), three.as_slice())]).is_err());
}

#[test]
fn test_corrupt_snapshot() {
    let err = TableMetadata::from_snapshot_bytes(&[1, 2, 3]).unwrap_err();
    assert!(matches!(err, Error::Deserialization(_)));
}

#[test]
fn test_unknown_kind_tag_in_metadata() {
    let mut input: &[u8] = &[0, 0, 0, 1, 0, 0, 0, 7];
    let err = codec::deserialize_all(&mut input, Version::CURRENT).unwrap_err();
    assert_eq!(err, DecodeError::UnknownKind(7));
}

#[test]
fn test_constraints_shared_across_threads() {
    let ctx = std::sync::Arc::new(TestContext::new(scores_table()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ctx = std::sync::Arc::clone(&ctx);
            std::thread::spawn(move || {
                let value = int(i * 4);
                let result = ctx.enforcer().check_update(&[(id("col"), value.as_slice())]);
                (i * 4 > 5) == result.is_ok()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

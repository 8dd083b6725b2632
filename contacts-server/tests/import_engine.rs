use contacts_server::import::{ContactImporter, ImportError, ImportOptions};
use contacts_server::test_support::{TestDatabase, TestDatabaseError, TestFixtures};

async fn provision(test_name: &str) -> Option<TestDatabase> {
    match TestDatabase::new_from_env().await {
        Ok(db) => Some(db),
        Err(TestDatabaseError::MissingUrl) => {
            eprintln!("skipping {test_name}: TEST_DATABASE_URL not set");
            None
        }
        Err(err) => panic!("failed to provision test database: {err:?}"),
    }
}

const THREE_CONTACTS: &str = "\
name,email,phone,address,tags
Ana Pérez,ana@example.com,+34600000001,Calle Mayor 1,clientes;vip
Luis Gómez,luis@example.com,+34600000002,,clientes
Marta Ruiz,marta@example.com,+34600000003,Gran Vía 3,
";

#[tokio::test]
async fn minimal_file_creates_one_contact() {
    let Some(test_db) = provision("minimal_file_creates_one_contact").await else {
        return;
    };
    let importer = ContactImporter::new(test_db.pool_clone());

    let summary = importer
        .import(
            b"name,email,phone\nAna,ana@x.com,+34123456789\n",
            &ImportOptions::default(),
        )
        .await
        .expect("import succeeds");

    assert_eq!((summary.created, summary.updated, summary.skipped), (1, 0, 0));
    assert!(summary.errors.is_empty());
    assert_eq!(
        summary.message(),
        "Importación: 1 creados, 0 actualizados, 0 omitidos."
    );

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn reimport_skips_or_updates_existing_emails() {
    let Some(test_db) = provision("reimport_skips_or_updates_existing_emails").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    let first = importer
        .import(THREE_CONTACTS.as_bytes(), &ImportOptions::default())
        .await
        .expect("first import");
    assert_eq!((first.created, first.updated, first.skipped), (3, 0, 0));

    let again = importer
        .import(THREE_CONTACTS.as_bytes(), &ImportOptions::default())
        .await
        .expect("second import");
    assert_eq!((again.created, again.updated, again.skipped), (0, 0, 3));
    assert!(again.errors.is_empty());

    let changed = THREE_CONTACTS.replace("Calle Mayor 1", "Calle Nueva 9");
    let updated = importer
        .import(
            changed.as_bytes(),
            &ImportOptions {
                update_existing: true,
                ..ImportOptions::default()
            },
        )
        .await
        .expect("update import");
    assert_eq!((updated.created, updated.updated, updated.skipped), (0, 3, 0));

    let address: String =
        sqlx::query_scalar("SELECT address FROM contacts WHERE email = 'ana@example.com'")
            .fetch_one(&pool)
            .await
            .expect("contact exists");
    assert_eq!(address, "Calle Nueva 9");

    let fixtures = TestFixtures::new(&pool);
    assert_eq!(fixtures.count_contacts().await.expect("count"), 3);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn row_without_email_is_reported_by_line() {
    let Some(test_db) = provision("row_without_email_is_reported_by_line").await else {
        return;
    };
    let importer = ContactImporter::new(test_db.pool_clone());

    let csv = "name,email,phone\nAna,ana@x.com,+34123456789\nLuis,,+34123456780\n";
    let summary = importer
        .import(csv.as_bytes(), &ImportOptions::default())
        .await
        .expect("import succeeds");

    assert_eq!((summary.created, summary.updated, summary.skipped), (1, 0, 1));
    assert_eq!(summary.errors, vec!["L3: faltan name/email/phone".to_string()]);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn tag_field_is_split_trimmed_and_deduplicated() {
    let Some(test_db) = provision("tag_field_is_split_trimmed_and_deduplicated").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    let csv = "name,email,phone,tags\nAna,ana@x.com,+34123456789,a;b; b ;\n";
    importer
        .import(csv.as_bytes(), &ImportOptions::default())
        .await
        .expect("import succeeds");

    let fixtures = TestFixtures::new(&pool);
    assert_eq!(
        fixtures.tag_names_for("ana@x.com").await.expect("tags"),
        vec!["a".to_string(), "b".to_string()]
    );

    let tag_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(&pool)
        .await
        .expect("count tags");
    assert_eq!(tag_rows, 2);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn empty_tags_on_update_keep_existing_tags() {
    let Some(test_db) = provision("empty_tags_on_update_keep_existing_tags").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    importer
        .import(
            b"name,email,phone,tags\nAna,ana@x.com,+34123456789,vip\n",
            &ImportOptions::default(),
        )
        .await
        .expect("first import");

    let summary = importer
        .import(
            b"name,email,phone,tags\nAna Maria,ana@x.com,+34123456789,\n",
            &ImportOptions {
                update_existing: true,
                ..ImportOptions::default()
            },
        )
        .await
        .expect("update import");
    assert_eq!(summary.updated, 1);

    let fixtures = TestFixtures::new(&pool);
    assert_eq!(
        fixtures.tag_names_for("ana@x.com").await.expect("tags"),
        vec!["vip".to_string()]
    );

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn missing_columns_abort_before_any_write() {
    let Some(test_db) = provision("missing_columns_abort_before_any_write").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    let err = importer
        .import(b"phone,nombre\n+34123456789,Ana\n", &ImportOptions::default())
        .await
        .expect_err("header is incomplete");

    match err {
        ImportError::MissingColumns(columns) => {
            assert_eq!(columns, vec!["email".to_string(), "name".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let fixtures = TestFixtures::new(&pool);
    assert_eq!(fixtures.count_contacts().await.expect("count"), 0);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn duplicate_phone_skips_only_that_row() {
    let Some(test_db) = provision("duplicate_phone_skips_only_that_row").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    let csv = "\
name,email,phone
Ana,ana@x.com,+34123456789
Luis,luis@x.com,+34123456789
Marta,marta@x.com,+34123456700
";
    let summary = importer
        .import(csv.as_bytes(), &ImportOptions::default())
        .await
        .expect("import succeeds");

    assert_eq!((summary.created, summary.skipped), (2, 1));
    assert_eq!(
        summary.errors,
        vec!["L3: ya existe un contacto con ese teléfono".to_string()]
    );

    let emails: Vec<String> = sqlx::query_scalar("SELECT email FROM contacts ORDER BY email")
        .fetch_all(&pool)
        .await
        .expect("emails");
    assert_eq!(emails, vec!["ana@x.com", "marta@x.com"]);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn invalid_rows_are_reported_and_the_rest_committed() {
    let Some(test_db) = provision("invalid_rows_are_reported_and_the_rest_committed").await else {
        return;
    };
    let importer = ContactImporter::new(test_db.pool_clone());

    let csv = "\
name;email;phone
Ana;no-es-un-email;+34123456789
Luis;luis@x.com;12
Marta;marta@x.com;+34123456700
";
    let summary = importer
        .import(
            csv.as_bytes(),
            &ImportOptions {
                delimiter: b';',
                ..ImportOptions::default()
            },
        )
        .await
        .expect("import succeeds");

    assert_eq!((summary.created, summary.skipped), (1, 2));
    assert_eq!(
        summary.errors,
        vec![
            "L2: Email inválido".to_string(),
            "L3: Número de teléfono inválido.".to_string(),
        ]
    );

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn latin1_file_is_decoded() {
    let Some(test_db) = provision("latin1_file_is_decoded").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    let mut bytes = b"name,email,phone\nJos".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b" Mu");
    bytes.push(0xF1);
    bytes.extend_from_slice(b"oz,jose@x.com,+34123456789\n");

    let summary = importer
        .import(&bytes, &ImportOptions::default())
        .await
        .expect("import succeeds");
    assert_eq!(summary.created, 1);

    let name: String = sqlx::query_scalar("SELECT name FROM contacts WHERE email = 'jose@x.com'")
        .fetch_one(&pool)
        .await
        .expect("contact exists");
    assert_eq!(name, "José Muñoz");

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn utf8_bom_does_not_hide_the_first_column() {
    let Some(test_db) = provision("utf8_bom_does_not_hide_the_first_column").await else {
        return;
    };
    let importer = ContactImporter::new(test_db.pool_clone());

    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"name,email,phone\nAna,ana@x.com,+34123456789\n");

    let summary = importer
        .import(&bytes, &ImportOptions::default())
        .await
        .expect("import succeeds");
    assert_eq!(summary.created, 1);

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn tags_on_update_replace_the_existing_set() {
    let Some(test_db) = provision("tags_on_update_replace_the_existing_set").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    importer
        .import(
            b"name,email,phone,tags\nAna,ana@x.com,+34123456789,vip;clientes\n",
            &ImportOptions::default(),
        )
        .await
        .expect("first import");

    let summary = importer
        .import(
            b"name,email,phone,tags\nAna,ana@x.com,+34123456789,c\n",
            &ImportOptions {
                update_existing: true,
                ..ImportOptions::default()
            },
        )
        .await
        .expect("update import");
    assert_eq!((summary.created, summary.updated), (0, 1));

    let fixtures = TestFixtures::new(&pool);
    assert_eq!(
        fixtures.tag_names_for("ana@x.com").await.expect("tags"),
        vec!["c".to_string()]
    );

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn existing_tags_are_reused() {
    let Some(test_db) = provision("existing_tags_are_reused").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let fixtures = TestFixtures::new(&pool);
    let existing = fixtures.insert_tag("a", "a").await.expect("insert tag");

    ContactImporter::new(pool.clone())
        .import(
            b"name,email,phone,tags\nAna,ana@x.com,+34123456789,a;b\n",
            &ImportOptions::default(),
        )
        .await
        .expect("import succeeds");

    let tags: Vec<(i32, String)> = sqlx::query_as("SELECT id, name FROM tags ORDER BY name")
        .fetch_all(&pool)
        .await
        .expect("tags");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0], (existing, "a".to_string()));
    assert_eq!(
        fixtures.tag_names_for("ana@x.com").await.expect("tags"),
        vec!["a".to_string(), "b".to_string()]
    );

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn colliding_tag_slug_fails_only_its_row() {
    let Some(test_db) = provision("colliding_tag_slug_fails_only_its_row").await else {
        return;
    };
    let pool = test_db.pool_clone();
    let importer = ContactImporter::new(pool.clone());

    let csv = "\
name,email,phone,tags
Ana,ana@x.com,+34123456789,VIP;vip
Luis,luis@x.com,+34123456780,
";
    let summary = importer
        .import(csv.as_bytes(), &ImportOptions::default())
        .await
        .expect("import succeeds");

    assert_eq!((summary.created, summary.skipped), (1, 1));
    assert_eq!(
        summary.errors,
        vec!["L2: ya existe una etiqueta con ese slug".to_string()]
    );

    let emails: Vec<String> = sqlx::query_scalar("SELECT email FROM contacts")
        .fetch_all(&pool)
        .await
        .expect("emails");
    assert_eq!(emails, vec!["luis@x.com"]);

    let tag_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(&pool)
        .await
        .expect("count tags");
    assert_eq!(tag_rows, 0);

    test_db.close().await.expect("failed to drop test database");
}

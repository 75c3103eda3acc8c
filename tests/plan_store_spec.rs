use speculate2::speculate;

speculate! {
    use std::sync::Arc;

    use monthplan::client::{self, HttpStore};
    use monthplan::config::ClientConfig;
    use monthplan::db::{Database, Document, DB_FILE_NAME};
    use monthplan::models::{Identity, NewPlan, PlanPatch};
    use monthplan::store::PlanStore;
    use tempfile::TempDir;
    use tokio_test::block_on;

    fn memory_store() -> Arc<dyn PlanStore> {
        Arc::new(Database::open_memory())
    }

    fn session(id: &str) -> Identity {
        Identity::Session(id.to_string())
    }

    fn user(id: &str) -> Identity {
        Identity::User(id.to_string())
    }

    fn pushups(date: &str) -> NewPlan {
        NewPlan::exercise("push-ups", Some("reps".into()), 20.0, date)
    }

    describe "list" {
        it "returns only records matching both date and identity" {
            let store = memory_store();
            block_on(store.insert(&session("s1"), pushups("2024-05-01"))).unwrap();
            block_on(store.insert(&session("s1"), pushups("2024-05-02"))).unwrap();
            block_on(store.insert(&session("s2"), pushups("2024-05-01"))).unwrap();
            block_on(store.insert(&user("s1"), pushups("2024-05-01"))).unwrap();

            let plans = block_on(store.list("2024-05-01", &session("s1"))).unwrap();
            assert_eq!(plans.len(), 1);
            assert_eq!(plans[0].plan_date, "2024-05-01");
            assert_eq!(plans[0].owner, session("s1"));
        }

        it "orders records by creation time" {
            let store = memory_store();
            for _ in 0..5 {
                block_on(store.insert(&user("u1"), pushups("2024-05-01"))).unwrap();
            }

            let plans = block_on(store.list("2024-05-01", &user("u1"))).unwrap();
            assert!(plans.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        }

        it "is empty for an unknown identity" {
            let store = memory_store();
            block_on(store.insert(&session("s1"), pushups("2024-05-01"))).unwrap();
            assert!(block_on(store.list("2024-05-01", &session("nobody"))).unwrap().is_empty());
        }
    }

    describe "update" {
        it "is a no-op for another identity even when the id exists" {
            let store = memory_store();
            let plan = block_on(store.insert(&user("u1"), pushups("2024-05-01"))).unwrap();

            let result = block_on(store.update(&plan.id, &user("u2"), PlanPatch::completed(true))).unwrap();
            assert!(result.is_none());

            let unchanged = block_on(store.list("2024-05-01", &user("u1"))).unwrap();
            assert_eq!(unchanged, vec![plan]);
        }

        it "only touches fields present in the patch" {
            let store = memory_store();
            let plan = block_on(store.insert(&session("s1"), pushups("2024-05-01"))).unwrap();

            let patch = PlanPatch { quantity: Some(25.0), ..Default::default() };
            let updated = block_on(store.update(&plan.id, &session("s1"), patch)).unwrap().unwrap();
            assert_eq!(updated.quantity, 25.0);
            assert_eq!(updated.content, plan.content);
            assert_eq!(updated.unit, plan.unit);
            assert_eq!(updated.completed, plan.completed);
        }
    }

    describe "delete" {
        it "removes the record from later lists" {
            let store = memory_store();
            let plan = block_on(store.insert(&session("s1"), pushups("2024-05-01"))).unwrap();

            assert!(block_on(store.delete(&plan.id, &session("s1"))).unwrap());
            assert!(block_on(store.list("2024-05-01", &session("s1"))).unwrap().is_empty());
        }

        it "reports false for a record owned by someone else" {
            let store = memory_store();
            let plan = block_on(store.insert(&session("s1"), pushups("2024-05-01"))).unwrap();

            assert!(!block_on(store.delete(&plan.id, &session("s2"))).unwrap());
            assert_eq!(block_on(store.list("2024-05-01", &session("s1"))).unwrap().len(), 1);
        }
    }

    describe "file store" {
        it "round-trips every collection through disk" {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join(DB_FILE_NAME);

            let db = Database::open(&path).unwrap();
            db.register_user(monthplan::models::CreateUserInput {
                email: "a@b.com".into(),
                password_hash: "hash".into(),
                full_name: None,
            }).unwrap();
            db.insert_plan(&user("u1"), pushups("2024-05-01")).unwrap();
            db.insert_plan(&session("s1"), pushups("2024-05-01")).unwrap();

            let written = std::fs::read_to_string(&path).unwrap();
            let parsed = Document::from_json(&written).unwrap();
            assert_eq!(parsed, db.snapshot().unwrap());
            assert_eq!(parsed.users.len(), 1);
            assert_eq!(parsed.profiles.len(), 1);
            assert_eq!(parsed.plans.len(), 1);
            assert_eq!(parsed.public_plans.len(), 1);
        }

        it "serializes concurrent writers without losing records" {
            let dir = TempDir::new().unwrap();
            let db = Database::open(dir.path().join(DB_FILE_NAME)).unwrap();

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let db = db.clone();
                    std::thread::spawn(move || {
                        let who = Identity::Session(format!("s{}", i % 2));
                        for _ in 0..5 {
                            db.insert_plan(&who, NewPlan::exercise("row", None, 1.0, "2024-05-01")).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let reopened = Database::open(dir.path().join(DB_FILE_NAME)).unwrap();
            assert_eq!(reopened.snapshot().unwrap().public_plans.len(), 40);
        }
    }

    describe "connect" {
        it "prefers the API, then the store file, then memory" {
            let dir = TempDir::new().unwrap();
            let api = client::connect(&ClientConfig {
                api_base: Some("http://127.0.0.1:9/api".into()),
                db_path: Some(dir.path().join(DB_FILE_NAME)),
                token: None,
            }).unwrap();
            assert_eq!(api.describe(), HttpStore::new("http://127.0.0.1:9/api", None).describe());

            let file = client::connect(&ClientConfig {
                db_path: Some(dir.path().join(DB_FILE_NAME)),
                ..Default::default()
            }).unwrap();
            assert!(file.describe().starts_with("file "));

            let memory = client::connect(&ClientConfig::default()).unwrap();
            assert_eq!(memory.describe(), "memory");
        }
    }
}

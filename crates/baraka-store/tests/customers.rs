use baraka_core::domain::CustomerId;
use baraka_core::CoreError;
use baraka_store::error::{StoreError, StoreErrorKind};
use baraka_store::repo::CustomerNew;
use baraka_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn new_customer(name: &str, phone: &str) -> CustomerNew {
    CustomerNew {
        display_name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        points: 0,
    }
}

#[test]
fn customer_crud_roundtrip() {
    let store = store();
    let now = 1_700_000_000;

    let customer = store
        .customers()
        .create(
            now,
            CustomerNew {
                display_name: "  Amina Rossi ".to_string(),
                phone: "+39 333 467 0058".to_string(),
                email: Some("amina@example.com".to_string()),
                points: 10,
            },
        )
        .expect("create customer");
    assert_eq!(customer.display_name, "Amina Rossi");
    assert_eq!(customer.phone, "+39 333 467 0058");

    let fetched = store
        .customers()
        .get(customer.id)
        .expect("get customer")
        .expect("customer exists");
    assert_eq!(fetched, customer);

    let updated = store
        .customers()
        .update_phone(now + 10, customer.id, "0039 333 467 0058")
        .expect("update phone");
    assert_eq!(updated.phone, "0039 333 467 0058");
    assert_eq!(updated.updated_at, now + 10);

    store.customers().delete(customer.id).expect("delete");
    assert!(store.customers().get(customer.id).expect("get").is_none());
}

#[test]
fn create_rejects_phone_without_digits() {
    let store = store();
    let err = store
        .customers()
        .create(1, new_customer("Nobody", "n/a"))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Core);
}

#[test]
fn list_orders_by_name() {
    let store = store();
    store
        .customers()
        .create(1, new_customer("zoe", "+393330000001"))
        .expect("create");
    store
        .customers()
        .create(2, new_customer("Ada", "+393330000002"))
        .expect("create");

    let names: Vec<String> = store
        .customers()
        .list()
        .expect("list")
        .into_iter()
        .map(|customer| customer.display_name)
        .collect();
    assert_eq!(names, vec!["Ada", "zoe"]);
}

#[test]
fn points_never_go_negative() {
    let store = store();
    let customer = store
        .customers()
        .create(1, new_customer("Omar", "+393330000003"))
        .expect("create");

    let credited = store
        .customers()
        .add_points(2, customer.id, 25)
        .expect("credit");
    assert_eq!(credited.points, 25);

    let redeemed = store
        .customers()
        .add_points(3, customer.id, -20)
        .expect("redeem");
    assert_eq!(redeemed.points, 5);

    let err = store
        .customers()
        .add_points(4, customer.id, -6)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Core(CoreError::NegativePoints(-1))
    ));
    let unchanged = store
        .customers()
        .get(customer.id)
        .expect("get")
        .expect("exists");
    assert_eq!(unchanged.points, 5);
}

#[test]
fn missing_customer_is_not_found() {
    let store = store();
    let id = CustomerId::new();
    let err = store.customers().add_points(1, id, 5).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
    let err = store.customers().delete(id).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

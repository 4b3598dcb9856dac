use diesel::RunQueryDsl;

#[derive(diesel::QueryableByName)]
struct Count {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    n: i64,
}

#[test]
fn migration_creates_spaces_table_with_rating_check() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set - skipping migration smoke test");
        return;
    }
    use saberes_persistence::pg::build_dev_pool_from_env;

    let pool = build_dev_pool_from_env().expect("build pool");
    let mut conn = pool.get().expect("conn");
    let count: Count = diesel::sql_query("SELECT count(*) AS n FROM information_schema.columns WHERE table_name = 'spaces'")
        .get_result(&mut conn)
        .expect("columns");
    assert_eq!(count.n, 37);

    let rejected = diesel::sql_query("INSERT INTO spaces (user_id, rating) VALUES (gen_random_uuid(), 6)").execute(&mut conn);
    assert!(rejected.is_err(), "rating > 5 must violate the check constraint");
}

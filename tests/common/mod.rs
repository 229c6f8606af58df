use pulsebeat::configuration::{get_configuration, DatabaseSettings, Settings};
use sqlx::{Connection, Executor, PgConnection, PgPool};

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate database");

    Ok(connection_pool)
}

/// Spawns the app against a throwaway database. Returns None when postgres
/// is unreachable so suites degrade to a skip instead of failing.
pub async fn spawn_app_with_configuration(mut configuration: Settings) -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping test: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let server = pulsebeat::startup::run(listener, connection_pool.clone(), configuration)
        .await
        .expect("Failed to bind address.");

    let _ = tokio::spawn(server);
    println!("Used Port: {}", port);

    Some(TestApp {
        address,
        db_pool: connection_pool,
    })
}

#[allow(dead_code)]
pub async fn spawn_app() -> Option<TestApp> {
    let configuration = get_configuration().expect("Failed to get configuration");
    spawn_app_with_configuration(configuration).await
}

/// Inserts a product and returns its id.
#[allow(dead_code)]
pub async fn seed_product(
    pool: &PgPool,
    name: &str,
    slug: &str,
    price: f64,
    category: &str,
) -> i32 {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO products (name, slug, description, price, category)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(name)
    .bind(slug)
    .bind(format!("Descripción de {}", name))
    .bind(price)
    .bind(category)
    .fetch_one(pool)
    .await
    .expect("Failed to seed product")
}

//! Basic example of the Wirebox resolution engine.
//!
//! Run with `RUST_LOG=wirebox_container=debug` to watch the container work.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wirebox::prelude::*;

// === Define your types ===

struct ConsoleLogger;

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Database {
    url: String,
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserRepository {
    db: Arc<Database>,
}

/// Generic auditing wrapper, specialized per audited contract.
struct Audited {
    inner: Instance,
}

struct UserService {
    repo: Arc<UserRepository>,
    audit: Arc<Audited>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.db().query(&format!("SELECT * FROM users WHERE id = {id}"))
    }

    fn db(&self) -> &Database {
        &self.repo.db
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wirebox_container=info")),
        )
        .init();

    let container = Container::builder()
        // Contracts
        .declare(TypeInfo::contract("Logger"))
        .declare(TypeInfo::contract("Database"))
        .declare(TypeInfo::contract("UserRepository"))
        .declare(TypeInfo::contract("UserService"))
        .declare(TypeInfo::contract(DependencyKey::open("Audit")))
        // Producers
        .declare(
            TypeInfo::concrete("ConsoleLogger")
                .satisfies("Logger")
                .constructor(Constructor::new([], |_| Ok(ConsoleLogger))),
        )
        .declare(
            TypeInfo::concrete("PostgresDatabase")
                .satisfies("Database")
                .constructor(Constructor::new([Param::of("Logger")], |args| {
                    Ok(Database {
                        url: "postgres://localhost/myapp".to_string(),
                        logger: args.next_as()?,
                    })
                })),
        )
        .declare(
            TypeInfo::concrete("SqlUserRepository")
                .satisfies("UserRepository")
                .constructor(Constructor::new([Param::of("Database")], |args| {
                    Ok(UserRepository { db: args.next_as()? })
                })),
        )
        .declare(
            TypeInfo::concrete(DependencyKey::open("AuditLog"))
                .satisfies(DependencyKey::open("Audit"))
                .constructor(Constructor::new([Param::type_argument()], |args| {
                    Ok(Audited { inner: args.next()? })
                })),
        )
        .declare(
            TypeInfo::concrete("DefaultUserService")
                .satisfies("UserService")
                .constructor(Constructor::new(
                    [
                        Param::of("UserRepository"),
                        Param::of(DependencyKey::open("Audit").bind("Logger")),
                    ],
                    |args| {
                        Ok(UserService {
                            repo: args.next_as()?,
                            audit: args.next_as()?,
                        })
                    },
                )),
        )
        // Bindings
        .singleton("Logger", "ConsoleLogger")
        .singleton("Database", "PostgresDatabase")
        .transient("UserRepository", "SqlUserRepository")
        .transient("UserService", "DefaultUserService")
        .transient(DependencyKey::open("Audit"), DependencyKey::open("AuditLog"))
        .build()?;

    let service = container.resolve_as::<UserService>("UserService")?;
    println!("{}", service.get_user(42));
    println!("Audit wraps: {}", service.audit.inner.producer());

    let again = container.resolve_as::<UserService>("UserService")?;
    println!(
        "Same database across services: {}",
        Arc::ptr_eq(&service.repo.db, &again.repo.db)
    );

    tracing::info!(registrations = container.descriptors().len(), "Demo finished");
    println!("Registrations after resolving:");
    for descriptor in container.descriptors() {
        println!(
            "  {} -> {} ({})",
            descriptor.contract, descriptor.producer, descriptor.lifetime
        );
    }

    Ok(())
}

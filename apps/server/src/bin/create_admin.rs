//! CLI tool to bootstrap an admin account.
//!
//! Usage:
//!   cargo run --bin create-admin -- --username admin --email admin@aiops.local --password admin

use std::env;

use aiops_testhub_lib::auth::hash_password;
use aiops_testhub_lib::config::Config;
use aiops_testhub_lib::db::{DbPool, users};

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_EMAIL: &str = "admin@aiops.local";
const DEFAULT_PASSWORD: &str = "admin";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut username = DEFAULT_USERNAME.to_string();
    let mut email = DEFAULT_EMAIL.to_string();
    let mut password = DEFAULT_PASSWORD.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--username" | "-u" => {
                i += 1;
                if i < args.len() {
                    username = args[i].clone();
                }
            }
            "--email" | "-e" => {
                i += 1;
                if i < args.len() {
                    email = args[i].clone();
                }
            }
            "--password" | "-p" => {
                i += 1;
                if i < args.len() {
                    password = args[i].clone();
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // Load config and initialize database
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    println!("Creating admin user...");

    match users::find_by_username(pool.connection(), &username).await {
        Ok(Some(existing)) => {
            println!("Admin user already exists!");
            println!("  Username: {}", existing.username);
            println!("  Email:    {}", existing.email);
            println!("  Is Admin: {}", existing.is_admin);
            return;
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error looking up user: {}", e);
            std::process::exit(1);
        }
    }

    let hashed = match hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    };

    let user = match users::insert(
        pool.connection(),
        users::NewUser {
            username: &username,
            email: &email,
            hashed_password: &hashed,
            is_admin: true,
        },
    )
    .await
    {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error creating user: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  Admin User Created");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  ID:       {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Email:    {}", user.email);
    if password == DEFAULT_PASSWORD {
        println!("  Password: {}", DEFAULT_PASSWORD);
        println!();
        println!("  ⚠️  Change the default password after first login!");
    }
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: create-admin [--username <name>] [--email <email>] [--password <password>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --username, -u  Admin username (default: admin)");
    eprintln!("  --email, -e     Admin email (default: admin@aiops.local)");
    eprintln!("  --password, -p  Admin password (default: admin)");
    eprintln!("  --help, -h      Show this help");
    eprintln!();
    eprintln!("Does nothing if the username already exists.");
    eprintln!();
}

//! Database seeder for Bookcrossing development and testing.
//!
//! Seeds two confirmed users (`bot` and `alex`, password `123456`) and a
//! handful of books so the catalogue is not empty on a fresh database.
//! Running it twice is harmless: existing users are left untouched.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use bookcrossing_core::auth::hash_password;
use bookcrossing_core::book::{BookInput, BookRepository as _};
use bookcrossing_core::user::NewUser;
use bookcrossing_db::{BookRepository, UserRepository, connect};
use bookcrossing_shared::AppConfig;

/// Password shared by all seeded users.
const SEED_PASSWORD: &str = "123456";

struct SeedBook {
    title: &'static str,
    author: &'static str,
    genre: &'static str,
    publishing_house: &'static str,
    year: i32,
}

const BOT_BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "Вино из одуванчиков",
        author: "Рэй Брэдбери",
        genre: "Повесть",
        publishing_house: "Эксмо",
        year: 1957,
    },
    SeedBook {
        title: "Портрет Дориана Грея",
        author: "Оскар Уайльд",
        genre: "Роман",
        publishing_house: "Азбука",
        year: 1890,
    },
];

const ALEX_BOOKS: &[SeedBook] = &[SeedBook {
    title: "Волки",
    author: "Юрий Верещагин",
    genre: "Фэнтези",
    publishing_house: "Альфа-книга",
    year: 2006,
}];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let users = UserRepository::new(db.clone());
    let books = BookRepository::new(db);

    for (login, name, city, shelf) in [
        ("bot", "Бот", "Москва", BOT_BOOKS),
        ("alex", "Алекс", "Новосибирск", ALEX_BOOKS),
    ] {
        if users.find_by_login(login).await?.is_some() {
            println!("User {login} exists, skipping");
            continue;
        }

        println!("Seeding user {login}...");
        let user = users
            .insert(
                NewUser {
                    login: login.to_string(),
                    name: name.to_string(),
                    email: format!("{login}@bookcrossing.local"),
                    city: Some(city.to_string()),
                    password_hash: hash_password(SEED_PASSWORD)?,
                },
                true,
            )
            .await?;

        for book in shelf {
            books
                .create(
                    user.id,
                    BookInput {
                        title: book.title.to_string(),
                        author: book.author.to_string(),
                        genre: Some(book.genre.to_string()),
                        description: None,
                        publishing_house: Some(book.publishing_house.to_string()),
                        year_of_publishing: Some(book.year),
                    },
                )
                .await?;
        }
        println!("  {} books", shelf.len());
    }

    println!("Seeding complete!");
    Ok(())
}

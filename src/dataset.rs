//! Synthetic comic dataset generation.
//!
//! Field values are drawn from fixed word lists, so every field is non-empty
//! and every year falls in `[FIRST_YEAR, current year]`. Generation is not
//! seeded by default; [`generate_with`] accepts any RNG when a repeatable
//! dataset is wanted.

use chrono::{Datelike, Utc};
use rand::Rng;

use crate::record::Comic;

/// Earliest publication year produced by the generator.
pub const FIRST_YEAR: i32 = 1938;

/// Inclusive range of availability counts.
pub const AVAILABLE_COUNT_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

// ---------------------------------------------------------------------------
// Word lists
// ---------------------------------------------------------------------------

const ADJECTIVES: &[&str] = &[
    "Crimson", "Silent", "Iron", "Midnight", "Savage", "Golden", "Hidden", "Broken",
    "Eternal", "Phantom", "Scarlet", "Frozen", "Atomic", "Wandering", "Lost", "Burning",
    "Hollow", "Radiant", "Shattered", "Last",
];

const NOUNS: &[&str] = &[
    "Gambit", "Legion", "Covenant", "Horizon", "Sentinel", "Empire", "Odyssey", "Vendetta",
    "Tide", "Crown", "Nexus", "Reckoning", "Frontier", "Oath", "Spectre", "Harbor",
    "Machine", "Dynasty", "Signal", "Storm",
];

const FIRST_NAMES: &[&str] = &[
    "Alan", "Grace", "Jack", "Marjorie", "Stan", "Ramona", "Will", "Kelly", "Frank",
    "Gail", "Neil", "Fiona", "Osamu", "Hergé", "Moebius", "Trina", "Chris", "Jill",
    "Brian", "Wendy",
];

const LAST_NAMES: &[&str] = &[
    "Moore", "Simone", "Kirby", "Henderson", "Lee", "Fradon", "Eisner", "Sue", "Miller",
    "Gaiman", "Staples", "Tezuka", "Robbins", "Claremont", "Thompson", "Vaughan", "Pini",
    "Ditko", "Woolfolk", "Buscema",
];

const PUBLISHER_NAMES: &[&str] = &[
    "Atlas", "Northstar", "Blue Lantern", "Meridian", "Quarry", "Ironwood", "Polaris",
    "Harbinger", "Kestrel", "Vanguard",
];

const PUBLISHER_SUFFIXES: &[&str] = &["Comics", "Press", "Publishing", "Studios", "Books"];

const GENRES: &[&str] = &[
    "Action", "Adventure", "Horror", "Fantasy", "Mystery", "Romance", "Superhero",
    "Western", "Noir", "Satire",
];

const PLACES: &[&str] = &[
    "the drowned city", "a forgotten moon", "the northern wastes", "a neon metropolis",
    "the last lighthouse", "an endless desert", "the underground market", "a frozen harbor",
];

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words[rng.gen_range(0..words.len())]
}

/// A short word sequence such as "The Crimson Gambit".
pub fn random_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("The {} {}", pick(rng, ADJECTIVES), pick(rng, NOUNS))
}

pub fn random_author<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

pub fn random_publisher<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, PUBLISHER_NAMES), pick(rng, PUBLISHER_SUFFIXES))
}

pub fn random_genre<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, GENRES).to_string()
}

pub fn random_description<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "A {} tale of {} and the {} of {}.",
        pick(rng, ADJECTIVES).to_lowercase(),
        random_author(rng),
        pick(rng, NOUNS).to_lowercase(),
        pick(rng, PLACES),
    )
}

/// A past year between [`FIRST_YEAR`] and the current year, inclusive.
pub fn random_year<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    let current = Utc::now().year().max(FIRST_YEAR);
    rng.gen_range(FIRST_YEAR..=current)
}

/// A count in [`AVAILABLE_COUNT_RANGE`].
pub fn random_available_count<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(AVAILABLE_COUNT_RANGE)
}

pub fn random_comic<R: Rng + ?Sized>(rng: &mut R) -> Comic {
    Comic {
        id: None,
        title: random_title(rng),
        author: random_author(rng),
        publisher: random_publisher(rng),
        year: random_year(rng),
        genre: random_genre(rng),
        description: random_description(rng),
    }
}

/// Generate exactly `count` comics with the thread-local RNG.
pub fn generate(count: usize) -> Vec<Comic> {
    generate_with(&mut rand::thread_rng(), count)
}

/// Generate exactly `count` comics from the given RNG.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Comic> {
    (0..count).map(|_| random_comic(rng)).collect()
}

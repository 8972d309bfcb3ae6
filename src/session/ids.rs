//! Human-readable session identifiers.
//!
//! Identifiers double as subdomains, so they stay lowercase, hyphenated,
//! and DNS-label safe: `adjective-animal-NN`.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "brave", "calm", "clever", "cosmic", "crisp", "eager", "fancy", "gentle", "happy",
    "humble", "jolly", "keen", "lively", "lucky", "mellow", "noble", "polite", "proud", "quiet",
    "rapid", "shiny", "swift", "witty",
];

const ANIMALS: &[&str] = &[
    "badger", "beaver", "bison", "crane", "dingo", "falcon", "ferret", "gecko", "heron", "ibex",
    "jackal", "koala", "lemur", "lynx", "marmot", "otter", "panda", "puffin", "quokka", "raven",
    "seal", "tapir", "walrus", "wombat",
];

/// Generate a fresh human-readable identifier.
pub fn random_id() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let animal = ANIMALS[rng.gen_range(0..ANIMALS.len())];
    format!("{}-{}-{}", adjective, animal, rng.gen_range(10..100))
}

//! DNS name assignment
//!
//! Each submitted test gets a random, lowercase name that prefixes the
//! domains of its instances (`<name>-<instance>.<zone>`).

use rand::RngExt;

use crate::common::{Error, Result};

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "bright", "brisk", "calm", "clever", "cosmic", "crisp", "curly",
    "daring", "dusty", "eager", "early", "fancy", "fizzy", "fluffy", "frosty", "gentle", "giddy",
    "golden", "grumpy", "happy", "hasty", "hollow", "humble", "icy", "jolly", "jumpy", "lazy",
    "lively", "lucky", "mellow", "merry", "misty", "nimble", "noisy", "odd", "plucky", "proud",
    "quick", "quiet", "rapid", "rusty", "shaggy", "shiny", "silent", "silly", "sleepy", "snappy",
    "sneaky", "spicy", "steady", "stormy", "sunny", "swift", "tidy", "tiny", "wacky", "witty",
];

const NOUNS: &[&str] = &[
    "badger", "beetle", "bison", "cactus", "comet", "condor", "coyote", "cricket", "dingo",
    "falcon", "ferret", "gecko", "glacier", "gopher", "heron", "hornet", "iguana", "jackal",
    "koala", "lemur", "lizard", "llama", "lobster", "magpie", "marmot", "meteor", "moose",
    "narwhal", "ocelot", "octopus", "otter", "panda", "parrot", "pelican", "penguin", "pigeon",
    "puffin", "quokka", "raven", "robin", "salmon", "sparrow", "squid", "tapir", "toucan",
    "turtle", "walrus", "weasel", "wombat", "yak", "zebra",
];

/// Generate a random lowercase name such as `brightotter`
pub fn silly_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{}{}", adjective, noun)
}

/// Check that a name can be used as a single DNS label
pub fn is_dns_label(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Assign one name per test using the default generator
///
/// Returns an empty list when DNS is disabled.
pub fn assign_names(count: usize, dns_disabled: bool, first: Option<&str>) -> Result<Vec<String>> {
    assign_names_with(count, dns_disabled, first, silly_name)
}

/// Assign names with a caller-supplied generator
///
/// The override only replaces the name of the first test and is lowercased.
/// No collision check is made between generated names.
pub fn assign_names_with<F>(
    count: usize,
    dns_disabled: bool,
    first: Option<&str>,
    mut generate: F,
) -> Result<Vec<String>>
where
    F: FnMut() -> String,
{
    if dns_disabled {
        return Ok(Vec::new());
    }

    let first = match first.map(str::trim).filter(|f| !f.is_empty()) {
        Some(name) => {
            let name = name.to_lowercase();
            if !is_dns_label(&name) {
                return Err(Error::InvalidDnsName(name));
            }
            Some(name)
        }
        None => None,
    };

    let mut names: Vec<String> = (0..count).map(|_| generate().to_lowercase()).collect();
    if let (Some(name), Some(slot)) = (first, names.first_mut()) {
        *slot = name;
    }
    Ok(names)
}

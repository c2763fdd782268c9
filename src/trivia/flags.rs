//! Reference set of countries and flags.

use rand::seq::IndexedRandom;

/// A country and its flag emoji.
#[derive(Debug, PartialEq, Eq)]
pub struct Flag {
    pub country: &'static str,
    pub symbol: &'static str,
}

impl Flag {
    /// Whether `answer` names this flag's country.
    ///
    /// Comparison ignores case and surrounding whitespace.
    pub fn matches(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.country.to_lowercase()
    }

    /// Picks a flag at random.
    pub fn random() -> &'static Flag {
        // FLAGS is never empty
        FLAGS.choose(&mut rand::rng()).unwrap_or(&FLAGS[0])
    }
}

pub static FLAGS: [Flag; 20] = [
    Flag { country: "Brazil", symbol: "🇧🇷" },
    Flag { country: "United States", symbol: "🇺🇸" },
    Flag { country: "Germany", symbol: "🇩🇪" },
    Flag { country: "United Kingdom", symbol: "🇬🇧" },
    Flag { country: "France", symbol: "🇫🇷" },
    Flag { country: "Japan", symbol: "🇯🇵" },
    Flag { country: "India", symbol: "🇮🇳" },
    Flag { country: "Canada", symbol: "🇨🇦" },
    Flag { country: "Australia", symbol: "🇦🇺" },
    Flag { country: "Italy", symbol: "🇮🇹" },
    Flag { country: "Mexico", symbol: "🇲🇽" },
    Flag { country: "Spain", symbol: "🇪🇸" },
    Flag { country: "Russia", symbol: "🇷🇺" },
    Flag { country: "South Korea", symbol: "🇰🇷" },
    Flag { country: "China", symbol: "🇨🇳" },
    Flag { country: "South Africa", symbol: "🇿🇦" },
    Flag { country: "Argentina", symbol: "🇦🇷" },
    Flag { country: "Egypt", symbol: "🇪🇬" },
    Flag { country: "Saudi Arabia", symbol: "🇸🇦" },
    Flag { country: "Nigeria", symbol: "🇳🇬" },
];

use serde::Serialize;

/// A named set of descriptive tags representing a travel persona
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ThemePool {
    pub name: &'static str,
    pub tags: &'static [&'static str],
}

impl ThemePool {
    /// Two pools are related when their tag sets intersect
    pub fn is_related(&self, other: &ThemePool) -> bool {
        self.tags.iter().any(|tag| other.tags.contains(tag))
    }

    /// Case-insensitive check of whether any of `tags` belongs to this pool
    pub fn matches_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|candidate| {
            let candidate = candidate.as_ref();
            self.tags.iter().any(|tag| tag.eq_ignore_ascii_case(candidate))
        })
    }
}

pub static THEME_POOLS: &[ThemePool] = &[
    ThemePool {
        name: "solo",
        tags: &[
            "Adventure",
            "Budget",
            "Camping",
            "Digital Nomad",
            "Hiking",
            "Photography",
            "Road Trip",
            "Solo",
            "Volunteering",
        ],
    },
    ThemePool {
        name: "luxury",
        tags: &[
            "Cruise",
            "Island Hopping",
            "Luxury",
            "Romantic",
            "Spa",
            "Wellness",
            "Relaxing",
            "Middle East",
        ],
    },
    ThemePool {
        name: "foodie",
        tags: &[
            "City Break",
            "Cooking Class",
            "Foodie",
            "Shopping",
            "Street Art",
        ],
    },
    ThemePool {
        name: "digital nomad",
        tags: &[
            "Asia",
            "Creative Retreat",
            "Digital Nomad",
            "Europe",
            "Photography",
            "Workation",
        ],
    },
    ThemePool {
        name: "adventure",
        tags: &[
            "Adventure",
            "Camping",
            "Desert",
            "Extreme Sports",
            "Hiking",
            "Mountains",
            "National Parks",
            "Wildlife Safari",
            "Water Sports",
            "Ski & Snowboard",
        ],
    },
    ThemePool {
        name: "nature",
        tags: &[
            "Beach",
            "Camping",
            "Eco Travel",
            "Forest",
            "Mountains",
            "National Parks",
            "Wildlife Safari",
            "Africa",
            "Oceania",
            "Pet-Friendly",
        ],
    },
    ThemePool {
        name: "romantic",
        tags: &[
            "Architecture",
            "Beach",
            "Island Hopping",
            "Luxury",
            "Romantic",
            "Spa",
            "Yoga Retreat",
        ],
    },
    ThemePool {
        name: "budget",
        tags: &[
            "Asia",
            "Backpacking",
            "Budget",
            "Europe",
            "Solo",
            "Study Abroad",
            "Weekend Getaway",
        ],
    },
    ThemePool {
        name: "family",
        tags: &[
            "Camping",
            "Christmas",
            "City Break",
            "Family",
            "National Parks",
            "Wildlife Safari",
        ],
    },
    ThemePool {
        name: "culture",
        tags: &[
            "Architecture",
            "Cultural",
            "Film Locations",
            "Historic Sites",
            "Language Learning",
            "Literary Travel",
            "Street Art",
            "Americas",
            "Middle East",
        ],
    },
    ThemePool {
        name: "party",
        tags: &[
            "Festival",
            "Group",
            "New Year",
            "Nightlife",
            "Party",
            "Summer",
        ],
    },
    ThemePool {
        name: "seasonal",
        tags: &[
            "Autumn",
            "Christmas",
            "Festival",
            "New Year",
            "Spring",
            "Summer",
            "Winter",
            "Ski & Snowboard",
            "Yoga Retreat",
        ],
    },
];

/// Resolves a travel style to its pool by exact, case-insensitive name
pub fn find_matching_pool(travel_style: &str) -> Option<&'static ThemePool> {
    THEME_POOLS
        .iter()
        .find(|pool| pool.name.to_lowercase() == travel_style.to_lowercase())
}

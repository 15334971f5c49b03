use serde::Serialize;

/// One entry of the trip tag vocabulary, with free-text search keywords
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredefinedTag {
    pub id: u32,
    pub tag: &'static str,
    pub search_text: &'static str,
}

pub static PREDEFINED_TAGS: &[PredefinedTag] = &[
    PredefinedTag {
        id: 1,
        tag: "Adventure",
        search_text: "adventure thrill hiking trekking",
    },
    PredefinedTag {
        id: 2,
        tag: "Relaxing",
        search_text: "relax spa unwind chill",
    },
    PredefinedTag {
        id: 3,
        tag: "Romantic",
        search_text: "romantic couple honeymoon love",
    },
    PredefinedTag {
        id: 4,
        tag: "Family",
        search_text: "family kids children child-friendly",
    },
    PredefinedTag {
        id: 5,
        tag: "Solo",
        search_text: "solo self solo travel alone",
    },
    PredefinedTag {
        id: 6,
        tag: "Group",
        search_text: "group friends together team",
    },
    PredefinedTag {
        id: 7,
        tag: "Budget",
        search_text: "budget cheap low-cost backpack",
    },
    PredefinedTag {
        id: 8,
        tag: "Luxury",
        search_text: "luxury premium five-star high-end",
    },
    PredefinedTag {
        id: 9,
        tag: "Road Trip",
        search_text: "road trip car drive scenic",
    },
    PredefinedTag {
        id: 10,
        tag: "Weekend Getaway",
        search_text: "weekend short quick escape",
    },
    PredefinedTag {
        id: 11,
        tag: "Digital Nomad",
        search_text: "remote work nomad laptop",
    },
    PredefinedTag {
        id: 12,
        tag: "Beach",
        search_text: "beach sand sea ocean coast",
    },
    PredefinedTag {
        id: 13,
        tag: "Mountains",
        search_text: "mountain hiking climb altitude",
    },
    PredefinedTag {
        id: 14,
        tag: "Forest",
        search_text: "forest jungle green nature",
    },
    PredefinedTag {
        id: 15,
        tag: "Desert",
        search_text: "desert sand dunes camel",
    },
    PredefinedTag {
        id: 16,
        tag: "National Parks",
        search_text: "parks nature wildlife protected",
    },
    PredefinedTag {
        id: 17,
        tag: "Wildlife Safari",
        search_text: "safari animals wildlife africa",
    },
    PredefinedTag {
        id: 18,
        tag: "Hiking",
        search_text: "hike trekking trails boots",
    },
    PredefinedTag {
        id: 19,
        tag: "Camping",
        search_text: "camping tents outdoors bonfire",
    },
    PredefinedTag {
        id: 20,
        tag: "City Break",
        search_text: "city break urban sightseeing",
    },
    PredefinedTag {
        id: 21,
        tag: "Nightlife",
        search_text: "nightlife bars clubs party",
    },
    PredefinedTag {
        id: 22,
        tag: "Historic Sites",
        search_text: "historic ruins landmarks monuments",
    },
    PredefinedTag {
        id: 23,
        tag: "Cultural",
        search_text: "culture heritage traditions museums",
    },
    PredefinedTag {
        id: 24,
        tag: "Architecture",
        search_text: "buildings design architecture",
    },
    PredefinedTag {
        id: 25,
        tag: "Street Art",
        search_text: "graffiti murals art city",
    },
    PredefinedTag {
        id: 26,
        tag: "Foodie",
        search_text: "foodie cuisine eats streetfood",
    },
    PredefinedTag {
        id: 27,
        tag: "Shopping",
        search_text: "shopping fashion stores market",
    },
    PredefinedTag {
        id: 28,
        tag: "Wellness",
        search_text: "wellness retreat balance self-care",
    },
    PredefinedTag {
        id: 29,
        tag: "Spa",
        search_text: "spa massage relax luxury",
    },
    PredefinedTag {
        id: 30,
        tag: "Yoga Retreat",
        search_text: "yoga wellness spiritual fitness",
    },
    PredefinedTag {
        id: 31,
        tag: "Photography",
        search_text: "camera photo travel shots",
    },
    PredefinedTag {
        id: 32,
        tag: "Festival",
        search_text: "festival seasonal music carnival celebration",
    },
    PredefinedTag {
        id: 33,
        tag: "Party",
        search_text: "party nightlife clubbing fun",
    },
    PredefinedTag {
        id: 34,
        tag: "Summer",
        search_text: "summer seasonal hot sunny beach",
    },
    PredefinedTag {
        id: 35,
        tag: "Winter",
        search_text: "winter seasonal snow ski christmas",
    },
    PredefinedTag {
        id: 36,
        tag: "Spring",
        search_text: "spring seasonal flowers cherry blossom",
    },
    PredefinedTag {
        id: 37,
        tag: "Autumn",
        search_text: "autumn seasonal fall foliage leaves",
    },
    PredefinedTag {
        id: 38,
        tag: "Christmas",
        search_text: "christmas seasonal market lights december",
    },
    PredefinedTag {
        id: 39,
        tag: "New Year",
        search_text: "new year seasonal celebration fireworks",
    },
    PredefinedTag {
        id: 40,
        tag: "Asia",
        search_text: "asia japan thailand bali",
    },
    PredefinedTag {
        id: 41,
        tag: "Europe",
        search_text: "europe france italy greece",
    },
    PredefinedTag {
        id: 42,
        tag: "Africa",
        search_text: "africa morocco kenya safari",
    },
    PredefinedTag {
        id: 43,
        tag: "Americas",
        search_text: "usa canada mexico brazil",
    },
    PredefinedTag {
        id: 44,
        tag: "Oceania",
        search_text: "australia new zealand",
    },
    PredefinedTag {
        id: 45,
        tag: "Middle East",
        search_text: "dubai jordan israel",
    },
    PredefinedTag {
        id: 46,
        tag: "Eco Travel",
        search_text: "eco sustainable green travel conscious ethical",
    },
    PredefinedTag {
        id: 47,
        tag: "Volunteering",
        search_text: "volunteer charity community help purpose",
    },
    PredefinedTag {
        id: 48,
        tag: "Pet-Friendly",
        search_text: "pet dog cat animal-friendly travel with pets",
    },
    PredefinedTag {
        id: 49,
        tag: "Mediterranean",
        search_text: "italy greece sea voyage culture luxury",
    },
    PredefinedTag {
        id: 50,
        tag: "Workation",
        search_text: "workation remote work business leisure bleisure",
    },
    PredefinedTag {
        id: 51,
        tag: "Creative Retreat",
        search_text: "creative writing art retreat journaling photography",
    },
    PredefinedTag {
        id: 52,
        tag: "Spiritual",
        search_text: "spiritual retreat mindfulness meditation healing",
    },
    PredefinedTag {
        id: 53,
        tag: "Cruise",
        search_text: "cruise ship sea voyage sailing luxury",
    },
    PredefinedTag {
        id: 55,
        tag: "Island Hopping",
        search_text: "island hopping boat beach tropical ferry",
    },
    PredefinedTag {
        id: 56,
        tag: "Extreme Sports",
        search_text: "extreme bungee skydiving adrenaline surf",
    },
    PredefinedTag {
        id: 57,
        tag: "Water Sports",
        search_text: "surfing diving snorkel kayaking paddleboard",
    },
    PredefinedTag {
        id: 58,
        tag: "Ski & Snowboard",
        search_text: "ski snowboarding slopes alpine winter",
    },
    PredefinedTag {
        id: 59,
        tag: "Language Learning",
        search_text: "language immersion learning spanish french school",
    },
    PredefinedTag {
        id: 60,
        tag: "Cooking Class",
        search_text: "cooking culinary food class lesson local",
    },
    PredefinedTag {
        id: 61,
        tag: "Film Locations",
        search_text: "movie filming scenes tv show set",
    },
    PredefinedTag {
        id: 62,
        tag: "Literary Travel",
        search_text: "books authors literature historic libraries",
    },
    PredefinedTag {
        id: 63,
        tag: "Study Abroad",
        search_text: "study abroad erasmus university student exchange",
    },
];

/// Searches the vocabulary by keyword
///
/// A blank term returns every tag. Otherwise the trimmed, lower-cased term is
/// matched as a substring of each tag's search keywords.
pub fn search_tags(term: &str) -> Vec<&'static PredefinedTag> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return PREDEFINED_TAGS.iter().collect();
    }

    PREDEFINED_TAGS
        .iter()
        .filter(|tag| tag.search_text.contains(term.as_str()))
        .collect()
}

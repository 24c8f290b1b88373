use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category value that disables category filtering.
pub const ANY_CATEGORY: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationListing {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub from_daily_rate: u32,
    pub duration: String,
    pub category: String,
    pub rating: f32,
    pub reviews: u32,
    pub highlights: Vec<String>,
    pub best_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u32,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub published_on: NaiveDate,
    pub category: String,
    pub read_minutes: u32,
    pub tags: Vec<String>,
}

/// Destination and journal listings shown on the public site.
///
/// Both lists are searched the same way: a case-insensitive substring match
/// on the text fields, combined with an exact category match where
/// [`ANY_CATEGORY`] (or no category) lets everything through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub destinations: Vec<DestinationListing>,
    pub posts: Vec<Post>,
}

impl Catalog {
    /// Destinations whose name or location contains `query`.
    pub fn filter_destinations(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Vec<&DestinationListing> {
        let needle = query.to_lowercase();
        self.destinations
            .iter()
            .filter(|listing| {
                contains_folded(&listing.name, &needle)
                    || contains_folded(&listing.location, &needle)
            })
            .filter(|listing| category_matches(category, &listing.category))
            .collect()
    }

    /// Posts whose title, excerpt or any tag contains `query`.
    pub fn filter_posts(&self, query: &str, category: Option<&str>) -> Vec<&Post> {
        let needle = query.to_lowercase();
        self.posts
            .iter()
            .filter(|post| {
                contains_folded(&post.title, &needle)
                    || contains_folded(&post.excerpt, &needle)
                    || post.tags.iter().any(|tag| contains_folded(tag, &needle))
            })
            .filter(|post| category_matches(category, &post.category))
            .collect()
    }
}

fn contains_folded(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

fn category_matches(selected: Option<&str>, category: &str) -> bool {
    match selected {
        None => true,
        Some(selected) => selected == ANY_CATEGORY || selected == category,
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    name: &str,
    location: &str,
    description: &str,
    from_daily_rate: u32,
    duration: &str,
    category: &str,
    (rating, reviews): (f32, u32),
    highlights: [&str; 3],
    best_time: &str,
) -> DestinationListing {
    DestinationListing {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        description: description.to_string(),
        from_daily_rate,
        duration: duration.to_string(),
        category: category.to_string(),
        rating,
        reviews,
        highlights: highlights.iter().map(ToString::to_string).collect(),
        best_time: best_time.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    id: u32,
    title: &str,
    excerpt: &str,
    author: &str,
    published_on: (i32, u32, u32),
    category: &str,
    read_minutes: u32,
    tags: [&str; 3],
) -> Post {
    let (year, month, day) = published_on;
    Post {
        id,
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        author: author.to_string(),
        published_on: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
        category: category.to_string(),
        read_minutes,
        tags: tags.iter().map(ToString::to_string).collect(),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let destinations = vec![
            listing(
                "maasai-mara",
                "Maasai Mara National Reserve",
                "Narok County",
                "Famous for the annual Great Migration and exceptional big cat sightings. Experience the raw beauty of the African savanna.",
                350,
                "3-7 days",
                "wildlife",
                (4.9, 324),
                ["Great Migration", "Big Five", "Cultural Experiences"],
                "July - October",
            ),
            listing(
                "amboseli",
                "Amboseli National Park",
                "Kajiado County",
                "Stunning views of Mount Kilimanjaro backdrop with large elephant herds. Perfect for photography enthusiasts.",
                280,
                "2-5 days",
                "photography",
                (4.8, 256),
                ["Mount Kilimanjaro Views", "Elephant Herds", "Photography"],
                "June - October",
            ),
            listing(
                "samburu",
                "Samburu National Reserve",
                "Samburu County",
                "Home to unique species like Grevy's zebra, reticulated giraffe, and Somali ostrich. Authentic cultural encounters.",
                320,
                "3-6 days",
                "cultural",
                (4.7, 189),
                ["Unique Wildlife", "Cultural Visits", "Ewaso Nyiro River"],
                "Year Round",
            ),
            listing(
                "tsavo",
                "Tsavo National Parks",
                "Coast Province",
                "Kenya's largest wildlife sanctuary, famous for red elephants and diverse landscapes from semi-arid to lush vegetation.",
                250,
                "3-5 days",
                "adventure",
                (4.6, 203),
                ["Red Elephants", "Diverse Landscapes", "Large Park"],
                "June - September",
            ),
            listing(
                "nakuru",
                "Lake Nakuru National Park",
                "Nakuru County",
                "Famous for flamingo spectacle and rhino sanctuary. Birdwatcher's paradise with over 400 bird species.",
                220,
                "1-3 days",
                "birdwatching",
                (4.5, 167),
                ["Flamingos", "Rhino Sanctuary", "Bird Watching"],
                "December - March",
            ),
            listing(
                "hells-gate",
                "Hell's Gate National Park",
                "Nakuru County",
                "Unique park where you can walk and cycle among wildlife. Dramatic landscapes with geothermal activity.",
                180,
                "1-2 days",
                "adventure",
                (4.4, 142),
                ["Walking Safari", "Cycling", "Geothermal Features"],
                "Year Round",
            ),
        ];

        let posts = vec![
            post(
                1,
                "The Great Migration: Best Times and Places to Witness Nature's Greatest Spectacle",
                "Discover the optimal timing and locations for experiencing the incredible wildebeest migration across the Maasai Mara ecosystem.",
                "Sarah Kenya",
                (2024, 1, 15),
                "Wildlife",
                8,
                ["Migration", "Maasai Mara", "Wildlife Photography"],
            ),
            post(
                2,
                "Photography Tips for Your First African Safari",
                "Essential camera settings, composition techniques, and equipment recommendations for capturing stunning wildlife photographs on safari.",
                "Michael Thompson",
                (2024, 1, 12),
                "Photography",
                12,
                ["Photography", "Tips", "Equipment"],
            ),
            post(
                3,
                "Cultural Encounters: Meeting the Maasai People",
                "Learn about the rich traditions and modern life of Kenya's Maasai community, and how tourism supports local communities.",
                "Grace Mwangi",
                (2024, 1, 10),
                "Culture",
                6,
                ["Maasai", "Culture", "Community Tourism"],
            ),
            post(
                4,
                "Budget Safari Planning: How to Experience Kenya Without Breaking the Bank",
                "Practical tips for planning an affordable Kenya safari while still enjoying incredible wildlife experiences and comfortable accommodations.",
                "James Wilson",
                (2024, 1, 8),
                "Budget Travel",
                10,
                ["Budget", "Planning", "Tips"],
            ),
            post(
                5,
                "Hidden Gems: Lesser-Known Safari Destinations in Kenya",
                "Explore off-the-beaten-path reserves and conservancies that offer intimate wildlife experiences away from the crowds.",
                "Emma Rodriguez",
                (2024, 1, 5),
                "Hidden Gems",
                9,
                ["Hidden Gems", "Conservancies", "Off the Beaten Path"],
            ),
            post(
                6,
                "Safari Packing Essentials: What to Bring and What to Leave Behind",
                "Complete packing checklist for your Kenya safari, including clothing, gear, and must-have items for different seasons.",
                "David Park",
                (2024, 1, 3),
                "Travel Tips",
                7,
                ["Packing", "Travel Tips", "Safari Gear"],
            ),
        ];

        Self {
            destinations,
            posts,
        }
    }
}

//! Real Seoul landmarks for realistic test fixtures.
//!
//! Coordinates are taken from OpenStreetMap and rounded to four decimals.
//! Areas are far enough apart (4 to 15 km) that clustering should keep
//! them separate.

use itinerary_planner::{Candidate, Category, Point};

/// A named location with coordinates and the district it sits in.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub district: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, district: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            district,
            lat,
            lng,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

// ============================================================================
// Jongno (palaces, Insadong, Bukchon)
// ============================================================================

pub const JONGNO_SIGHTS: &[Location] = &[
    Location::new("Gyeongbokgung Palace", "Jongno-gu", 37.5796, 126.9770),
    Location::new("Changdeokgung Palace", "Jongno-gu", 37.5794, 126.9910),
    Location::new("Bukchon Hanok Village", "Jongno-gu", 37.5826, 126.9830),
    Location::new("Jogyesa Temple", "Jongno-gu", 37.5740, 126.9818),
    Location::new("National Folk Museum", "Jongno-gu", 37.5818, 126.9790),
];

pub const JONGNO_RESTAURANTS: &[Location] = &[
    Location::new("Tosokchon Samgyetang", "Jongno-gu", 37.5778, 126.9715),
    Location::new("Gwangjang Market", "Jongno-gu", 37.5700, 126.9996),
    Location::new("Jinokhwa Dakhanmari", "Jongno-gu", 37.5707, 127.0055),
    Location::new("Insadong Sanchon", "Jongno-gu", 37.5746, 126.9862),
];

pub const JONGNO_CAFES: &[Location] = &[
    Location::new("Cafe Onion Anguk", "Jongno-gu", 37.5768, 126.9860),
    Location::new("Dawon Teahouse", "Jongno-gu", 37.5733, 126.9860),
];

// ============================================================================
// Jung-gu (Myeongdong, Namsan)
// ============================================================================

pub const JUNG_SIGHTS: &[Location] = &[
    Location::new("Deoksugung Palace", "Jung-gu", 37.5658, 126.9751),
    Location::new("Myeongdong Cathedral", "Jung-gu", 37.5633, 126.9873),
    Location::new("Namsangol Hanok Village", "Jung-gu", 37.5593, 126.9945),
];

pub const JUNG_RESTAURANTS: &[Location] = &[
    Location::new("Myeongdong Kyoja", "Jung-gu", 37.5625, 126.9856),
    Location::new("Hadongkwan", "Jung-gu", 37.5637, 126.9849),
    Location::new("Namdaemun Galchi Alley", "Jung-gu", 37.5590, 126.9770),
];

pub const JUNG_OTHER: &[(Location, Category)] = &[
    (Location::new("N Seoul Tower", "Jung-gu", 37.5512, 126.9882), Category::NightView),
    (Location::new("Namdaemun Market", "Jung-gu", 37.5592, 126.9776), Category::Shopping),
    (Location::new("Coffee Hanyakbang", "Jung-gu", 37.5662, 126.9880), Category::Cafe),
];

// ============================================================================
// Mapo (Hongdae, Yeonnam, Mangwon)
// ============================================================================

pub const MAPO_PLACES: &[(Location, Category)] = &[
    (Location::new("Hongdae Street", "Mapo-gu", 37.5563, 126.9236), Category::Shopping),
    (Location::new("Gyeongui Line Forest Park", "Mapo-gu", 37.5600, 126.9250), Category::Nature),
    (Location::new("Trick Eye Museum", "Mapo-gu", 37.5538, 126.9208), Category::Activity),
    (Location::new("Mangwon Market", "Mapo-gu", 37.5560, 126.9060), Category::Restaurant),
    (Location::new("Yeonnam Hyang", "Mapo-gu", 37.5620, 126.9240), Category::Restaurant),
    (Location::new("Hapjeong Dakgalbi", "Mapo-gu", 37.5495, 126.9140), Category::Restaurant),
    (Location::new("Anthracite Hapjeong", "Mapo-gu", 37.5480, 126.9170), Category::Cafe),
    (Location::new("Yeonnam Bakery", "Mapo-gu", 37.5612, 126.9229), Category::Cafe),
];

// ============================================================================
// Gangnam
// ============================================================================

pub const GANGNAM_PLACES: &[(Location, Category)] = &[
    (Location::new("COEX Mall", "Gangnam-gu", 37.5118, 127.0592), Category::Shopping),
    (Location::new("Bongeunsa Temple", "Gangnam-gu", 37.5150, 127.0573), Category::Culture),
    (Location::new("Seolleung Royal Tombs", "Gangnam-gu", 37.5088, 127.0487), Category::Culture),
    (Location::new("Garosu-gil", "Gangnam-gu", 37.5210, 127.0230), Category::Shopping),
    (Location::new("Samwon Garden", "Gangnam-gu", 37.5230, 127.0390), Category::Restaurant),
    (Location::new("Jungsik", "Gangnam-gu", 37.5253, 127.0410), Category::Restaurant),
    (Location::new("Bongeunsa Noodles", "Gangnam-gu", 37.5135, 127.0560), Category::Restaurant),
    (Location::new("Cafe Kitsune Sinsa", "Gangnam-gu", 37.5200, 127.0225), Category::Cafe),
];

// ============================================================================
// Songpa (Jamsil)
// ============================================================================

pub const SONGPA_PLACES: &[(Location, Category)] = &[
    (Location::new("Lotte World", "Songpa-gu", 37.5111, 127.0980), Category::ThemePark),
    (Location::new("Seoul Sky", "Songpa-gu", 37.5126, 127.1025), Category::NightView),
    (Location::new("Seokchon Lake", "Songpa-gu", 37.5090, 127.1000), Category::Nature),
    (Location::new("Olympic Park", "Songpa-gu", 37.5209, 127.1215), Category::Nature),
    (Location::new("Songridan-gil Bistro", "Songpa-gu", 37.5100, 127.1070), Category::Restaurant),
    (Location::new("Jamsil Saemaeul Market", "Songpa-gu", 37.5110, 127.0830), Category::Restaurant),
    (Location::new("Seokchon Lake Roastery", "Songpa-gu", 37.5075, 127.1030), Category::Cafe),
];

// ============================================================================
// Lodging (never scheduled, useful as anchors)
// ============================================================================

pub const HOTELS: &[Location] = &[
    Location::new("Lotte Hotel Seoul", "Jung-gu", 37.5650, 126.9810),
    Location::new("Four Seasons Seoul", "Jongno-gu", 37.5717, 126.9754),
];

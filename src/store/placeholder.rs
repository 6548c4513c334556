use moment_exchange_common::{Location, Moment};

/// プールが空のときに見せるダミーの瞬間
pub fn placeholder_moments(timestamp: &str) -> Vec<Moment> {
    let places = [
        ("Tokyo", "Japan", "東京", "日本", 35.6762, 139.6503),
        ("Lisbon", "Portugal", "里斯本", "葡萄牙", 38.7223, -9.1393),
        ("Reykjavik", "Iceland", "雷克雅維克", "冰島", 64.1466, -21.9426),
    ];

    places
        .iter()
        .enumerate()
        .map(|(i, (city, country, city_zh, country_zh, lat, lng))| Moment {
            id: format!("placeholder-{}", i + 1),
            image_url: format!("https://picsum.photos/seed/moment-{}/1080/1920", i + 1),
            location: Location {
                city: city.to_string(),
                country: country.to_string(),
                city_localized: city_zh.to_string(),
                country_localized: country_zh.to_string(),
                latitude: *lat,
                longitude: *lng,
            },
            timestamp: timestamp.to_string(),
            caption: String::new(),
            reactions: Default::default(),
        })
        .collect()
}

use crate::models::{Executive, WhiteHouse};

/// Current executive branch. Changes once per term, so it is not fetched.
pub fn white_house() -> WhiteHouse {
    WhiteHouse {
        president: Executive {
            name: "Donald J. Trump".to_string(),
            title: "President of the United States".to_string(),
            party: "R".to_string(),
            image_url: "https://www.whitehouse.gov/wp-content/uploads/2025/01/president_official_portrait_2025.jpg"
                .to_string(),
            start_date: "2025-01-20".to_string(),
            twitter_account: Some("POTUS".to_string()),
        },
        vice_president: Executive {
            name: "J.D. Vance".to_string(),
            title: "Vice President of the United States".to_string(),
            party: "R".to_string(),
            image_url: "https://www.whitehouse.gov/wp-content/uploads/2025/01/vp_official_portrait_2025.jpg"
                .to_string(),
            start_date: "2025-01-20".to_string(),
            twitter_account: Some("VP".to_string()),
        },
    }
}

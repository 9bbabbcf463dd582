use crate::store::CampgroundStore;
use crate::types::*;

/// Username that owns the fixture campgrounds and comments.
pub const SEED_AUTHOR: &str = "Homer";

const LOREM: &str = "There are many variations of passages of Lorem Ipsum available, but the majority have suffered alteration in some form, by injected humour, or randomised words which don't look even slightly believable. If you are going to use a passage of Lorem Ipsum, you need to be sure there isn't anything embarrassing hidden in the middle of text.";

const SEED_COMMENT: &str = "This place is great, but I wish there was internet";

struct Fixture {
    name: &'static str,
    price: &'static str,
    image_url: &'static str,
}

const FIXTURES: [Fixture; 3] = [
    Fixture {
        name: "Clouds Rest",
        price: "12.00",
        image_url: "https://images.unsplash.com/photo-1571863533956-01c88e79957e?auto=format&fit=crop&w=500&q=60",
    },
    Fixture {
        name: "Desert Mesa",
        price: "9.50",
        image_url: "https://images.unsplash.com/photo-1455763916899-e8b50eca9967?auto=format&fit=crop&w=500&q=60",
    },
    Fixture {
        name: "Canyon Floor",
        price: "15.00",
        image_url: "https://images.unsplash.com/19/nomad.JPG?auto=format&fit=crop&w=500&q=60",
    },
];

/// Replaces every campground and comment with the fixture listings, each
/// carrying one comment, all authored by `author`.
pub async fn seed_database(
    store: &dyn CampgroundStore,
    author: &Author,
) -> Result<Vec<Campground>, StoreError> {
    store.clear().await?;
    log::info!("Removed campgrounds");

    let mut seeded = Vec::with_capacity(FIXTURES.len());
    for fixture in &FIXTURES {
        let campground = store
            .insert_campground(NewCampground {
                name: fixture.name.to_string(),
                price: fixture.price.to_string(),
                description: LOREM.to_string(),
                image: CampgroundImage {
                    url: fixture.image_url.to_string(),
                    host_id: None,
                },
                author: author.clone(),
            })
            .await?;
        log::info!("Added campground {}", campground.name);

        store
            .add_comment(
                &campground.id,
                NewComment {
                    text: SEED_COMMENT.to_string(),
                    author: author.clone(),
                },
            )
            .await?;

        // re-read so the returned value carries the comment id
        if let Some(campground) = store.find_campground(&campground.id).await? {
            seeded.push(campground);
        }
    }

    Ok(seeded)
}

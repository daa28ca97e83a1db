use async_trait::async_trait;
use nyc_affordability::enrich::{enrich_grocery, enrich_social, enrich_transit};
use nyc_affordability::error::ProviderError;
use nyc_affordability::output::write_zip_csv;
use nyc_affordability::scoring::aggregate::aggregate_by_zip;
use nyc_affordability::scoring::classify::GroceryTaxonomy;
use nyc_affordability::scoring::composer::{ReferenceRent, score_listings};
use nyc_affordability::scoring::grocery::GroceryScorer;
use nyc_affordability::scoring::transit::{TransitScorer, default_destinations};
use nyc_affordability::scoring::venue::{DensityStrategy, VenueDensityScorer};
use nyc_affordability::scoring::weights::ScoreWeights;
use nyc_affordability::services::{NearbyQuery, RouteTime, TransitTimes, VenueSearch};
use nyc_affordability::store::{CsvListingStore, ListingStore};
use nyc_affordability::types::{Coordinate, Venue};
use std::fs;

const BROOKLYN: &str = "\
address,zip,price,lat,lng,url,bedrooms,bathrooms,sqft,Transit Score,Social Score,Grocery Score
1 Court St,11201,2000,40.6930,-73.9900,,1,1,,80,0,0
2 Court St,11201,2500,40.6931,-73.9901,,1,1,,80,0,0
3 Court St,11201,3000,40.6932,-73.9902,,2,1,,80,0,0
4 Court St,11201,TBD,40.6933,-73.9903,,1,1,,0,0,0
";

const CHELSEA: &str = "\
Address,Zip Code,Rental Price,Latitude,Longitude
10 W 30th St,10001,4000,40.7466,-73.9885
20 W 30th St,10001,5000,,
";

/// Same venues at every radius; names pick the grocery tier.
struct FixedVenues(Vec<Venue>);

#[async_trait]
impl VenueSearch for FixedVenues {
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<Venue>, ProviderError> {
        if query.center.lat > 40.74 {
            return Err(ProviderError::RateLimited);
        }
        Ok(self.0.clone())
    }
}

struct FixedMinutes(f64);

#[async_trait]
impl TransitTimes for FixedMinutes {
    async fn travel_time(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
    ) -> Result<RouteTime, ProviderError> {
        Ok(RouteTime::Minutes(self.0))
    }
}

fn venue(id: &str, name: &str) -> Venue {
    Venue {
        id: id.to_string(),
        name: name.to_string(),
        address: "Brooklyn, NY".to_string(),
        categories: vec![],
    }
}

#[test]
fn test_zip_aggregate_from_stored_listings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("11201 Rental Listings.csv"), BROOKLYN).unwrap();

    let listings = CsvListingStore::new(dir.path()).load().unwrap().listings;
    let scored = score_listings(&listings, &ScoreWeights::default(), ReferenceRent::BatchMedian);
    let zips = aggregate_by_zip(&scored);

    assert_eq!(zips.len(), 1);
    let zip = &zips[0];
    assert_eq!(zip.zip.as_str(), "11201");
    assert_eq!(zip.listing_count, 3);
    assert_eq!(zip.median_rent, 2500);
    assert_eq!(zip.avg_transit_score, 80);
    // housing 70/50/30 around the 2500 median
    assert_eq!(zip.avg_housing_score, 50);
    assert_eq!(zip.coordinate.unwrap().lat, 40.6930);

    // idempotent rescoring
    assert_eq!(
        scored,
        score_listings(&listings, &ScoreWeights::default(), ReferenceRent::BatchMedian)
    );
}

#[tokio::test]
async fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("11201 Rental Listings.csv"), BROOKLYN).unwrap();
    fs::write(dir.path().join("10001 Rental Listings.csv"), CHELSEA).unwrap();
    let store = CsvListingStore::new(dir.path());

    let mut loaded = store.load().unwrap();
    assert_eq!(loaded.listings.len(), 5);
    assert_eq!(loaded.rejected.len(), 1);

    let venues = vec![
        venue("a", "Trader Joe's"),
        venue("b", "Whole Foods Market"),
        venue("c", "Corner Deli"),
    ];
    let transit = TransitScorer::new(FixedMinutes(45.0), default_destinations());
    let social = VenueDensityScorer::new(FixedVenues(venues.clone()), DensityStrategy::default());
    let grocery = GroceryScorer::new(FixedVenues(venues), GroceryTaxonomy::default());

    let t = enrich_transit(&mut loaded.listings, &transit).await;
    let s = enrich_social(&mut loaded.listings, &social).await;
    let g = enrich_grocery(&mut loaded.listings, &grocery).await;

    assert_eq!((t.succeeded, t.degraded, t.skipped), (4, 0, 1));
    // the located 10001 listing sits above the stub's failure latitude
    assert_eq!((s.succeeded, s.degraded, s.skipped), (3, 1, 1));
    assert_eq!((g.succeeded, g.degraded, g.skipped), (3, 1, 1));

    store.save(&loaded).unwrap();
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.listings, loaded.listings);
    // the unpriced row is still on disk
    assert_eq!(reloaded.rejected.len(), 1);
    let reloaded = reloaded.listings;

    let brooklyn: Vec<_> = reloaded
        .iter()
        .filter(|l| l.zip.as_str() == "11201")
        .collect();
    for l in &brooklyn {
        assert_eq!(l.metrics.transit_score, 60);
        // three venues first seen at 200m, weight 3
        assert_eq!(l.metrics.social_raw, 9);
        // 10 budget + 5 regular - 3 premium
        assert_eq!(l.metrics.grocery_raw, 12);
    }

    let scored = score_listings(&reloaded, &ScoreWeights::default(), ReferenceRent::Fixed(3000.0));
    let zips = aggregate_by_zip(&scored);
    assert_eq!(zips.len(), 2);
    assert!(zips[0].affordability_index >= zips[1].affordability_index);
    assert_eq!(zips[0].zip.as_str(), "11201");

    let out = dir.path().join("zipcode_scores.csv");
    write_zip_csv(&out, &zips).unwrap();
    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().nth(1).unwrap().starts_with("11201,"));
}

// Criterion benchmarks for the Local Loop geospatial core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use localloop_geo::core::{
    distance::haversine_distance, scoring::geo_score, AreaStatistics, CoverageValidator, Matcher,
};
use localloop_geo::models::{Coordinate, Entity, Geofence, LocationFields};

const CENTER_LAT: f64 = 23.1167;
const CENTER_LNG: f64 = 72.5667;

fn create_entity(id: usize, lat: f64, lng: f64) -> Entity {
    // Alternate the coordinate spellings the resolver has to walk through
    let nested = id % 2 == 0;
    Entity {
        name: Some(format!("Entity {}", id)),
        location: nested.then(|| LocationFields::new(lat, lng)),
        latitude: (!nested).then_some(lat),
        longitude: (!nested).then_some(lng),
        ..Entity::default()
    }
    .with_field("id", id.to_string())
    .with_field("active_orders", (id % 4) as u32)
}

fn create_entities(count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.1;
            let lng_offset = (i as f64 * 0.0007) % 0.1;
            create_entity(i, CENTER_LAT + lat_offset, CENTER_LNG + lng_offset)
        })
        .collect()
}

fn center() -> Coordinate {
    Coordinate::new(CENTER_LAT, CENTER_LNG).unwrap_or(Coordinate::origin())
}

fn bench_haversine_distance(c: &mut Criterion) {
    let a = center();
    let b = Coordinate::new(23.0365, 72.5611).unwrap_or(Coordinate::origin());

    c.bench_function("haversine_distance", |bench| {
        bench.iter(|| haversine_distance(black_box(a), black_box(b)));
    });
}

fn bench_nearby(c: &mut Criterion) {
    let matcher = Matcher::new(5.0);
    let customer = LocationFields::new(CENTER_LAT, CENTER_LNG);

    let mut group = c.benchmark_group("nearby");

    for count in [10, 100, 1000, 10000].iter() {
        let entities = create_entities(*count);

        group.bench_with_input(BenchmarkId::new("vendors", count), count, |b, _| {
            b.iter(|| matcher.nearby_vendors(black_box(&customer), black_box(entities.clone())));
        });

        group.bench_with_input(BenchmarkId::new("delivery_partners", count), count, |b, _| {
            b.iter(|| {
                matcher.nearby_delivery_partners(black_box(&customer), black_box(entities.clone()))
            });
        });
    }

    group.finish();
}

fn bench_area_statistics(c: &mut Criterion) {
    let stats = AreaStatistics::new(5.0);
    let vendors = create_entities(1000);
    let customers = create_entities(5000);
    let partners = create_entities(200);

    c.bench_function("area_statistics_6200_entities", |b| {
        b.iter(|| {
            stats.area_stats(
                black_box(center()),
                black_box(&vendors),
                black_box(&customers),
                black_box(&partners),
            )
        });
    });
}

fn bench_coverage_and_geo(c: &mut Criterion) {
    let validator = CoverageValidator::new(5.0);
    let vendor = Coordinate::new(23.13, 72.57).unwrap_or(Coordinate::origin());
    let partner = Coordinate::new(23.12, 72.56).unwrap_or(Coordinate::origin());
    let geofence = Geofence::CenterRadius(center());

    c.bench_function("validate_coverage", |b| {
        b.iter(|| validator.validate_coverage(black_box(center()), black_box(vendor), black_box(partner)));
    });

    c.bench_function("geo_score_center_radius", |b| {
        b.iter(|| geo_score(black_box(Some(vendor)), black_box(&geofence)));
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_nearby,
    bench_area_statistics,
    bench_coverage_and_geo
);

criterion_main!(benches);

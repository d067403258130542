use crate::assessment::domain::{CriterionKey, ImpactTier};
use crate::assessment::relationship::{bundled_catalog, bundled_strategies, CompatibilityPoint};
use crate::assessment::sequence::SequenceBuilder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

#[test]
fn bundled_catalog_covers_every_point_in_order() {
    let catalog = bundled_catalog().expect("bundled catalog parses");

    assert!(catalog.missing_keys().is_empty());
    let keys: Vec<CompatibilityPoint> = catalog.criteria().iter().map(|c| c.key).collect();
    assert_eq!(keys, CompatibilityPoint::ordered().to_vec());

    for criterion in catalog.criteria() {
        assert_eq!(criterion.impact_tier, criterion.key.impact_tier(), "{:?}", criterion.key);
        assert_eq!(criterion.name, criterion.key.label());
        assert!(!criterion.questions.is_empty());
    }
}

#[test]
fn slugs_match_the_serialized_keys() {
    for point in CompatibilityPoint::ordered() {
        let json = serde_json::to_string(&point).expect("serializes");
        assert_eq!(json, format!("\"{}\"", point.slug()));
    }
}

#[test]
fn tiers_split_four_eight_four_four() {
    let count = |tier: ImpactTier| {
        CompatibilityPoint::ordered()
            .iter()
            .filter(|point| point.impact_tier() == tier)
            .count()
    };
    assert_eq!(count(ImpactTier::VeryHigh), 4);
    assert_eq!(count(ImpactTier::High), 8);
    assert_eq!(count(ImpactTier::ModerateHigh), 4);
    assert_eq!(count(ImpactTier::Moderate), 4);
}

#[test]
fn curated_domains_have_display_names() {
    let catalog = bundled_catalog().expect("bundled catalog parses");

    for point in CompatibilityPoint::ordered() {
        if let Some(set) = catalog.domain_set(point) {
            assert_ne!(catalog.domain_name(&set.domain), set.domain, "{point:?}");
        }
    }
}

#[test]
fn bundled_question_ids_are_unique() {
    let catalog = bundled_catalog().expect("bundled catalog parses");
    let builder = SequenceBuilder::new(&catalog);
    let mut rng = StdRng::seed_from_u64(11);
    let stage1 = builder.stage1(&mut rng);

    let mut seen = BTreeSet::new();
    for question in &stage1 {
        assert!(seen.insert(question.id.clone()), "duplicate {}", question.id);
    }
    assert_eq!(stage1.len(), 20);
}

#[test]
fn bundled_strategies_parse_with_generic_fallback() {
    let strategies = bundled_strategies().expect("bundled strategies parse");

    assert!(!strategies.generic.immediate.is_empty());
    let (_, generic) = strategies.lookup(CompatibilityPoint::CoreValues);
    assert!(!generic);
    let (set, generic) = strategies.lookup(CompatibilityPoint::LifestyleCompatibility);
    assert!(generic);
    assert_eq!(set, &strategies.generic);
}

#[test]
fn bundled_insights_name_themes_and_known_points() {
    let catalog = bundled_catalog().expect("bundled catalog parses");
    let insights = catalog.insights();

    assert_eq!(insights.themes.len(), 5);
    assert!(insights.themes.contains_key("resentment"));
    assert!(insights
        .points
        .contains_key(&CompatibilityPoint::TrustReliability));
    assert!(!insights.points.contains_key(&CompatibilityPoint::CoreValues));
}

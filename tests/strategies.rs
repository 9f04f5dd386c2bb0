//! Parametrized checks shared by the list-based search strategies: each
//! picks one entry from a configured list and reports it with the entity/
//! attribute hints the iTunes search API expects.

use otodoki_supply::errors::AppError;
use otodoki_supply::strategies::artist::ArtistSearchStrategy;
use otodoki_supply::strategies::genre::GenreSearchStrategy;
use otodoki_supply::strategies::random_keyword::RandomKeywordStrategy;
use otodoki_supply::strategies::release_year::ReleaseYearSearchStrategy;
use otodoki_supply::strategies::{SearchStrategy, StrategyParams};
use rstest::rstest;

fn term_of(params: StrategyParams) -> String {
    match params {
        StrategyParams::Term { term, .. } => term,
        StrategyParams::Terms { .. } => panic!("expected Term, got Terms"),
    }
}

#[rstest]
#[case::random_keyword(
    Box::new(RandomKeywordStrategy::new(vec!["idol".to_string(), "utsu".to_string()])) as Box<dyn SearchStrategy>,
    "random_keyword",
    vec!["idol".to_string(), "utsu".to_string()],
    None,
    None,
)]
#[case::artist_search(
    Box::new(ArtistSearchStrategy::new(vec!["YOASOBI".to_string()])) as Box<dyn SearchStrategy>,
    "artist_search",
    vec!["YOASOBI".to_string()],
    Some("musicTrack".to_string()),
    None,
)]
#[case::genre_search(
    Box::new(GenreSearchStrategy::new(vec!["J-Pop".to_string()])) as Box<dyn SearchStrategy>,
    "genre_search",
    vec!["J-Pop".to_string()],
    Some("song".to_string()),
    Some("genreIndex".to_string()),
)]
#[case::release_year_search(
    Box::new(ReleaseYearSearchStrategy::new(vec!["2024".to_string()])) as Box<dyn SearchStrategy>,
    "release_year_search",
    vec!["2024".to_string()],
    Some("song".to_string()),
    Some("releaseYearTerm".to_string()),
)]
#[tokio::test]
async fn picks_a_configured_term_with_expected_hints(
    #[case] mut strategy: Box<dyn SearchStrategy>,
    #[case] expected_name: &str,
    #[case] allowed_terms: Vec<String>,
    #[case] expected_entity: Option<String>,
    #[case] expected_attribute: Option<String>,
) {
    assert_eq!(strategy.name(), expected_name);

    for _ in 0..10 {
        let params = strategy.generate_params().await.expect("list is non-empty");
        let (term, entity, attribute) = match params {
            StrategyParams::Term { term, entity, attribute } => (term, entity, attribute),
            StrategyParams::Terms { .. } => panic!("expected Term variant"),
        };
        assert!(allowed_terms.contains(&term));
        assert_eq!(entity, expected_entity);
        assert_eq!(attribute, expected_attribute);
    }
}

#[rstest]
#[case::random_keyword(Box::new(RandomKeywordStrategy::new(Vec::new())) as Box<dyn SearchStrategy>)]
#[case::artist_search(Box::new(ArtistSearchStrategy::new(Vec::new())) as Box<dyn SearchStrategy>)]
#[case::genre_search(Box::new(GenreSearchStrategy::new(Vec::new())) as Box<dyn SearchStrategy>)]
#[case::release_year_search(Box::new(ReleaseYearSearchStrategy::new(Vec::new())) as Box<dyn SearchStrategy>)]
#[tokio::test]
async fn empty_configured_list_yields_empty_result_error(#[case] mut strategy: Box<dyn SearchStrategy>) {
    let err = strategy.generate_params().await.unwrap_err();
    assert!(matches!(err, AppError::EmptyResult { .. }));
}

#[tokio::test]
async fn normalize_trims_and_rejects_blank_terms() {
    let params = StrategyParams::Term {
        term: "  idol  ".to_string(),
        entity: None,
        attribute: None,
    };
    assert_eq!(term_of(params.normalize().unwrap()), "idol");

    let blank = StrategyParams::Term {
        term: "   ".to_string(),
        entity: None,
        attribute: None,
    };
    assert!(blank.normalize().is_none());
}

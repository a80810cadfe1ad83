use mockito::{Matcher, Server};
use recipe_search::{
    translate, DedupPolicy, EdamamProvider, InMemoryRecipeStore, JsonFileStore, NormalizedRecipe,
    PageLimits, RecipeAggregator, RecipeSource, ResponseSource, SpoonacularProvider,
    UiFilterState,
};
use std::time::Duration;

fn local_recipe(id: &str, title: &str) -> NormalizedRecipe {
    NormalizedRecipe::new(id, title, RecipeSource::Local)
}

fn pasta_filters() -> UiFilterState {
    UiFilterState {
        search: "pasta".to_string(),
        cuisines: vec!["italian".to_string()],
        page: Some(1),
        page_size: Some(2),
        ..Default::default()
    }
}

async fn spoonacular_with_pasta(server: &mut Server) -> mockito::Mock {
    server
        .mock("GET", "/recipes/complexSearch")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "pasta".into()),
            Matcher::UrlEncoded("cuisine".into(), "italian".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "results": [
                    {"id": 1, "title": "Pasta B (ext)", "cuisines": ["Italian"]},
                    {"id": 2, "title": "Pasta C", "cuisines": ["Italian"]}
                ],
                "totalResults": 2
            }"#,
        )
        .create_async()
        .await
}

/// Edamam without credentials resolves to nothing
fn unconfigured_edamam() -> EdamamProvider {
    EdamamProvider::with_base_url(None, None, "http://127.0.0.1:9".to_string())
}

#[tokio::test]
async fn test_bare_id_policy_lets_local_win() {
    let mut server = Server::new_async().await;
    let mock = spoonacular_with_pasta(&mut server).await;

    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(vec![local_recipe("1", "Pasta A")]))
        .provider(SpoonacularProvider::with_base_url(
            Some("test-key".to_string()),
            server.url(),
        ))
        .provider(unconfigured_edamam())
        .dedup_policy(DedupPolicy::BareId)
        .build();

    let query = translate(&pasta_filters(), &PageLimits::default());
    let response = aggregator.search_recipes(&query).await;

    let titles: Vec<&str> = response.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Pasta A", "Pasta C"]);
    assert_eq!(response.results[0].source, RecipeSource::Local);
    assert_eq!(response.results[1].source, RecipeSource::Spoonacular);
    assert_eq!(response.total, 2);
    assert_eq!(response.source, ResponseSource::All);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_source_qualified_policy_keeps_both_ids() {
    let mut server = Server::new_async().await;
    let _mock = spoonacular_with_pasta(&mut server).await;

    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(vec![local_recipe("1", "Pasta A")]))
        .provider(SpoonacularProvider::with_base_url(
            Some("test-key".to_string()),
            server.url(),
        ))
        .build();

    let query = translate(&pasta_filters(), &PageLimits::default());
    let response = aggregator.search_recipes(&query).await;

    let titles: Vec<&str> = response.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Pasta A", "Pasta B (ext)"]);
    assert_eq!(response.total, 3);
}

#[tokio::test]
async fn test_title_policy_drops_external_copy_of_local_recipe() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/recipes/complexSearch")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"results": [
                {"id": 77, "title": "Grandma's  Lasagna"},
                {"id": 78, "title": "Baked Ziti"}
            ]}"#,
        )
        .create_async()
        .await;

    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(vec![local_recipe("9", "grandma's lasagna")]))
        .provider(SpoonacularProvider::with_base_url(
            Some("test-key".to_string()),
            server.url(),
        ))
        .dedup_policy(DedupPolicy::SourceQualifiedOrTitle)
        .build();

    let query = translate(&UiFilterState::default(), &PageLimits::default());
    let response = aggregator.search_recipes(&query).await;

    let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["9", "78"]);
    assert_eq!(response.results[0].source, RecipeSource::Local);
}

#[tokio::test]
async fn test_unreachable_providers_leave_local_results() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/recipes/complexSearch")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(vec![
            local_recipe("1", "Soup"),
            local_recipe("2", "Stew"),
            local_recipe("3", "Salad"),
        ]))
        .provider(SpoonacularProvider::with_base_url(
            Some("test-key".to_string()),
            server.url(),
        ))
        .provider(EdamamProvider::with_base_url(
            Some("app".to_string()),
            Some("key".to_string()),
            "http://127.0.0.1:9".to_string(),
        ))
        .timeout(Duration::from_secs(5))
        .build();

    let query = translate(&UiFilterState::default(), &PageLimits::default());
    let response = aggregator.search_recipes(&query).await;

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.total, 3);
    assert_eq!(response.source, ResponseSource::All);
    failing.assert_async().await;
}

#[tokio::test]
async fn test_unconfigured_providers_make_no_requests() {
    let mut server = Server::new_async().await;
    let never = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let aggregator = RecipeAggregator::builder()
        .provider(SpoonacularProvider::with_base_url(None, server.url()))
        .provider(EdamamProvider::with_base_url(None, Some("key".to_string()), server.url()))
        .build();

    let query = translate(&pasta_filters(), &PageLimits::default());
    let response = aggregator.search_recipes(&query).await;

    assert!(response.results.is_empty());
    assert_eq!(response.total, 0);
    never.assert_async().await;
}

#[tokio::test]
async fn test_second_page_of_merged_results() {
    let recipes: Vec<NormalizedRecipe> = (1..=25)
        .map(|i| local_recipe(&i.to_string(), &format!("Recipe {}", i)))
        .collect();
    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(recipes))
        .build();

    let filters = UiFilterState {
        page: Some(2),
        page_size: Some(10),
        ..Default::default()
    };
    let response = aggregator
        .search_recipes(&translate(&filters, &PageLimits::default()))
        .await;

    let ids: Vec<String> = response.results.iter().map(|r| r.id.clone()).collect();
    let expected: Vec<String> = (11..=20).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);
    assert_eq!(response.total, 25);
}

#[tokio::test]
async fn test_page_never_exceeds_page_size() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/recipes/complexSearch")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"results": [
                {"id": 1, "title": "One"}, {"id": 2, "title": "Two"},
                {"id": 3, "title": "Three"}, {"id": 4, "title": "Four"}
            ]}"#,
        )
        .create_async()
        .await;

    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(vec![
            local_recipe("a", "Alpha"),
            local_recipe("b", "Beta"),
        ]))
        .provider(SpoonacularProvider::with_base_url(
            Some("test-key".to_string()),
            server.url(),
        ))
        .build();

    for page_size in 1..=7 {
        let filters = UiFilterState {
            page_size: Some(page_size),
            ..Default::default()
        };
        let response = aggregator
            .search_recipes(&translate(&filters, &PageLimits::default()))
            .await;
        assert!(response.results.len() <= page_size as usize);
        assert!(response.total >= response.results.len());
    }
}

#[tokio::test]
async fn test_total_signals_more_pages_from_large_provider() {
    let results: Vec<String> = (1..=30)
        .map(|i| format!(r#"{{"id": {i}, "title": "External {i}"}}"#))
        .collect();
    let body = format!(
        r#"{{"results": [{}], "totalResults": 500}}"#,
        results.join(",")
    );

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/recipes/complexSearch")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let aggregator = RecipeAggregator::builder()
        .provider(SpoonacularProvider::with_base_url(
            Some("test-key".to_string()),
            server.url(),
        ))
        .build();

    for page in 1..=3 {
        let filters = UiFilterState {
            page: Some(page),
            page_size: Some(10),
            ..Default::default()
        };
        let response = aggregator
            .search_recipes(&translate(&filters, &PageLimits::default()))
            .await;

        assert_eq!(response.results.len(), 10);
        assert_eq!(response.total, 30);
        let first = (page - 1) * 10 + 1;
        assert_eq!(response.results[0].id, first.to_string());
    }
}

#[tokio::test]
async fn test_local_tags_match_regardless_of_case() {
    let mut risotto = local_recipe("1", "Risotto");
    risotto.cuisines.insert("Italian".to_string());
    let mut tacos = local_recipe("2", "Tacos");
    tacos.cuisines.insert("MEXICAN".to_string());

    let aggregator = RecipeAggregator::builder()
        .local(InMemoryRecipeStore::new(vec![risotto, tacos]))
        .build();

    let filters = UiFilterState {
        cuisines: vec!["Italian".to_string()],
        ..Default::default()
    };
    let response = aggregator
        .search_recipes(&translate(&filters, &PageLimits::default()))
        .await;
    let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
}

#[tokio::test]
async fn test_local_file_tags_match_regardless_of_case() {
    let path = std::env::temp_dir().join(format!(
        "recipe-search-it-{}-mixed-case.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"[
            {"id": "1", "title": "Risotto", "cuisines": ["Italian"], "mealTypes": ["Dinner"]},
            {"id": "2", "title": "Pancakes", "cuisines": ["American"], "mealTypes": ["Breakfast"]}
        ]"#,
    )
    .unwrap();

    let aggregator = RecipeAggregator::builder()
        .local(JsonFileStore::new(&path))
        .build();

    let filters = UiFilterState {
        cuisines: vec!["italian".to_string()],
        meal_types: vec!["dinner".to_string()],
        ..Default::default()
    };
    let response = aggregator
        .search_recipes(&translate(&filters, &PageLimits::default()))
        .await;

    assert_eq!(response.total, 1);
    assert_eq!(response.results[0].title, "Risotto");
    assert!(response.results[0].cuisines.contains("italian"));

    std::fs::remove_file(path).ok();
}

use rag_store::{RagError, RagStore, SearchConfig, SearchQuery, VectorQuery};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn store(server: &MockServer) -> RagStore {
    RagStore::new(SearchConfig::new_default(server.uri(), "search-key", "northwind")).unwrap()
}

#[tokio::test]
async fn hybrid_search_sends_text_and_vector_and_ranks_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/northwind/docs/search"))
        .and(query_param("api-version", "2023-11-01"))
        .and(header("api-key", "search-key"))
        .and(body_json(json!({
            "search": "What does the Northwind Health Plus plan cover?",
            "select": "title,chunk",
            "top": 2,
            "vectorQueries": [{"kind": "vector", "vector": [0.5, 0.5], "k": 50, "fields": "text_vector"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"@search.score": 0.01, "title": "Employee_Handbook.pdf", "chunk": "Vacation policy."},
                {"@search.score": 0.03, "title": "Northwind_Health_Plus_Benefits_Details.pdf", "chunk": "Covers dental and vision."},
                {"@search.score": 0.02, "title": "Benefit_Options.pdf", "chunk": "Plus adds vision."}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::hybrid(
        "What does the Northwind Health Plus plan cover?",
        VectorQuery {
            vector: vec![0.5, 0.5],
            k_nearest_neighbors: 50,
        },
        2,
    );
    let hits = store(&server).search(&query).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Northwind_Health_Plus_Benefits_Details.pdf");
    assert_eq!(hits[0].content, "Covers dental and vision.");
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn bad_key_and_missing_index_are_typed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/northwind/docs/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = store(&server)
        .search(&SearchQuery::keyword("dental", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::Unauthorized { status: 403, .. }));

    let other = RagStore::new(SearchConfig::new_default(server.uri(), "search-key", "missing")).unwrap();
    let err = other.ping().await.unwrap_err();
    assert!(matches!(err, RagError::IndexNotFound(ref idx) if idx == "missing"));
}

#[tokio::test]
async fn ping_issues_single_result_keyword_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"search": "test", "select": "title,chunk", "top": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).ping().await.unwrap();
}

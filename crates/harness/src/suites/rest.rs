//! REST suite: book and user service CRUD, search, and edge cases.
//!
//! Both services must answer before anything else runs; everything after
//! the precondition is failure-isolated. Update and delete targets are
//! resolved in three tiers (stored id, search by a known fixture title,
//! hardcoded default) so the suite degrades instead of cascading when
//! creation failed. The hardcoded defaults can collide with unrelated
//! persisted rows.

use std::time::Duration;

use libris_application::{resolve_id, Scenario, Step, StepContext, StepFlow, StepFuture};
use libris_domain::{
    Encoding, EndpointTarget, HttpMethod, RequestBody, RequestSpec, StatusExpectation,
};
use serde_json::json;
use tracing::info;

/// Builds the REST scenario.
#[must_use]
pub fn scenario(pacing: Duration) -> Scenario {
    Scenario::new(
        "rest services",
        vec![
            Step::new("service preconditions", preconditions),
            Step::new("create books", create_books),
            Step::new("read books", read_books),
            Step::new("search books", search_books),
            Step::new("update book", update_book),
            Step::new("delete book", delete_book),
            Step::new("create users", create_users),
            Step::new("read users", read_users),
            Step::new("update user", update_user),
            Step::new("delete user", delete_user),
            Step::new("invalid requests", edge_cases),
        ],
    )
    .with_pacing(pacing)
}

fn book_request(ctx: &StepContext<'_>, method: HttpMethod, path: &str) -> RequestSpec {
    RequestSpec::new(EndpointTarget::rest(method, &ctx.targets.book_base, path))
}

fn user_request(ctx: &StepContext<'_>, method: HttpMethod, path: &str) -> RequestSpec {
    RequestSpec::new(EndpointTarget::rest(method, &ctx.targets.user_base, path))
}

fn book_fixtures() -> [serde_json::Value; 3] {
    [
        json!({
            "isbn": "9789999999991",
            "title": "Introduction to Go Programming",
            "author": "John Doe",
            "publishYear": 2023,
            "category": "Programming",
            "availableQuantity": 5,
        }),
        json!({
            "isbn": "9789999999992",
            "title": "Advanced Go Patterns",
            "author": "Jane Smith",
            "publishYear": 2024,
            "category": "Programming",
            "availableQuantity": 3,
        }),
        json!({
            "isbn": "9789999999993",
            "title": "Database Design Fundamentals",
            "author": "Peter Chen",
            "publishYear": 2022,
            "category": "Database",
            "availableQuantity": 4,
        }),
    ]
}

fn user_fixtures() -> [serde_json::Value; 3] {
    [
        json!({
            "username": "alice123",
            "email": "alice@example.com",
            "firstName": "Alice",
            "lastName": "Johnson",
        }),
        json!({
            "username": "bob456",
            "email": "bob@example.com",
            "firstName": "Bob",
            "lastName": "Smith",
        }),
        json!({
            "username": "charlie789",
            "email": "charlie@example.com",
            "firstName": "Charlie",
            "lastName": "Brown",
        }),
    ]
}

/// First listed book id for a percent-encoded title search, if any.
async fn first_book_id(ctx: &StepContext<'_>, encoded_title: &str) -> Option<i64> {
    let request = book_request(
        ctx,
        HttpMethod::Get,
        &format!("/api/books/search?title={encoded_title}"),
    );
    let outcome = ctx.dispatch(&request).await;
    outcome
        .body()
        .map(super::data_ids)
        .and_then(|ids| ids.first().copied())
}

fn preconditions<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let books = book_request(ctx, HttpMethod::Get, "/api/books").with_timeout_ms(2_000);
        let outcome = ctx.probe("book service reachable", &books).await;
        if !outcome.is_received() {
            return StepFlow::Fatal("book service is not reachable".to_string());
        }

        let users = user_request(ctx, HttpMethod::Get, "/api/users").with_timeout_ms(2_000);
        let outcome = ctx.probe("user service reachable", &users).await;
        if !outcome.is_received() {
            return StepFlow::Fatal("user service is not reachable".to_string());
        }
        StepFlow::Continue
    })
}

fn create_books<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        for (index, book) in book_fixtures().into_iter().enumerate() {
            let request = book_request(ctx, HttpMethod::Post, "/api/books")
                .with_body(RequestBody::json(book));
            let outcome = ctx
                .expect(
                    &format!("create book {}", index + 1),
                    &request,
                    StatusExpectation::exact(201),
                )
                .await;
            if outcome.status() == Some(201) {
                if let Some(id) = outcome
                    .extract("id", Encoding::Json)
                    .and_then(|raw| raw.parse().ok())
                {
                    ctx.state.created_book_ids.push(id);
                }
            }
        }
        StepFlow::Continue
    })
}

fn read_books<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let ok = StatusExpectation::exact(200);
        let listings = [
            ("list books", "/api/books"),
            ("list books page 1", "/api/books?page=1&limit=2"),
            ("list books page 2", "/api/books?page=2&limit=2"),
            ("get book 1", "/api/books/1"),
            ("get book 2", "/api/books/2"),
        ];
        for (name, path) in listings {
            let request = book_request(ctx, HttpMethod::Get, path);
            ctx.expect(name, &request, ok.clone()).await;
        }

        let request = book_request(ctx, HttpMethod::Get, "/api/books/999");
        ctx.expect("get missing book", &request, StatusExpectation::exact(404))
            .await;
        StepFlow::Continue
    })
}

fn search_books<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let searches = [
            ("search by title Go", "/api/books/search?title=Go"),
            ("search by title Database", "/api/books/search?title=Database"),
            ("search with no results", "/api/books/search?title=NonExistent"),
            (
                "search with pagination",
                "/api/books/search?title=Go&page=1&limit=1",
            ),
        ];
        for (name, path) in searches {
            let request = book_request(ctx, HttpMethod::Get, path);
            ctx.expect(name, &request, StatusExpectation::exact(200))
                .await;
        }
        StepFlow::Continue
    })
}

fn update_book<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let stored = ctx.state.created_book_ids.first().copied();
        let lookup_ctx: &StepContext<'_> = ctx;
        let (book_id, tier) = resolve_id(
            stored,
            || first_book_id(lookup_ctx, "Introduction%20to%20Go%20Programming"),
            1,
        )
        .await;
        info!(book_id, %tier, "resolved update target");

        let update = json!({
            "isbn": "9789999999991",
            "title": "Introduction to Go Programming (2nd Edition)",
            "author": "John Doe",
            "publishYear": 2024,
            "category": "Programming",
            "availableQuantity": 10,
        });
        let request = book_request(ctx, HttpMethod::Put, &format!("/api/books/{book_id}"))
            .with_body(RequestBody::json(update));
        ctx.expect("update book", &request, StatusExpectation::exact(200))
            .await;

        let request = book_request(ctx, HttpMethod::Get, &format!("/api/books/{book_id}"));
        ctx.expect("verify book update", &request, StatusExpectation::exact(200))
            .await;
        StepFlow::Continue
    })
}

fn delete_book<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let stored = ctx.state.created_book_ids.get(2).copied();
        let lookup_ctx: &StepContext<'_> = ctx;
        let (book_id, tier) = resolve_id(
            stored,
            || first_book_id(lookup_ctx, "Database%20Design%20Fundamentals"),
            3,
        )
        .await;
        info!(book_id, %tier, "resolved delete target");

        let request = book_request(ctx, HttpMethod::Delete, &format!("/api/books/{book_id}"));
        ctx.expect("delete book", &request, StatusExpectation::exact(204))
            .await;

        let request = book_request(ctx, HttpMethod::Get, &format!("/api/books/{book_id}"));
        ctx.expect(
            "verify book deletion",
            &request,
            StatusExpectation::exact(404),
        )
        .await;
        StepFlow::Continue
    })
}

fn create_users<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        for (index, user) in user_fixtures().into_iter().enumerate() {
            let request = user_request(ctx, HttpMethod::Post, "/api/users")
                .with_body(RequestBody::json(user));
            let outcome = ctx
                .expect(
                    &format!("create user {}", index + 1),
                    &request,
                    StatusExpectation::exact(201),
                )
                .await;
            if outcome.status() == Some(201) {
                if let Some(id) = outcome
                    .extract("id", Encoding::Json)
                    .and_then(|raw| raw.parse().ok())
                {
                    ctx.state.created_user_ids.push(id);
                }
            }
        }
        StepFlow::Continue
    })
}

fn read_users<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let listings = [
            ("list users", "/api/users"),
            ("list users page 1", "/api/users?page=1&limit=2"),
            ("list users page 2", "/api/users?page=2&limit=2"),
            ("get user 1", "/api/users/1"),
            ("get user 2", "/api/users/2"),
        ];
        for (name, path) in listings {
            let request = user_request(ctx, HttpMethod::Get, path);
            ctx.expect(name, &request, StatusExpectation::exact(200))
                .await;
        }

        let request = user_request(ctx, HttpMethod::Get, "/api/users/999");
        ctx.expect("get missing user", &request, StatusExpectation::exact(404))
            .await;
        StepFlow::Continue
    })
}

fn update_user<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let update = json!({
            "username": "alice_updated",
            "email": "alice.new@example.com",
            "firstName": "Alice",
            "lastName": "Johnson-Smith",
        });
        let request = user_request(ctx, HttpMethod::Put, "/api/users/1")
            .with_body(RequestBody::json(update));
        ctx.expect("update user", &request, StatusExpectation::exact(200))
            .await;

        let request = user_request(ctx, HttpMethod::Get, "/api/users/1");
        ctx.expect("verify user update", &request, StatusExpectation::exact(200))
            .await;
        StepFlow::Continue
    })
}

fn delete_user<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let request = user_request(ctx, HttpMethod::Delete, "/api/users/3");
        ctx.expect("delete user", &request, StatusExpectation::exact(204))
            .await;

        let request = user_request(ctx, HttpMethod::Get, "/api/users/3");
        ctx.expect(
            "verify user deletion",
            &request,
            StatusExpectation::exact(404),
        )
        .await;
        StepFlow::Continue
    })
}

fn edge_cases<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let bad = StatusExpectation::exact(400);

        let request = book_request(ctx, HttpMethod::Get, "/api/books/abc");
        ctx.expect("non-numeric book id", &request, bad.clone()).await;

        let request = user_request(ctx, HttpMethod::Get, "/api/users/xyz");
        ctx.expect("non-numeric user id", &request, bad.clone()).await;

        let request = book_request(ctx, HttpMethod::Get, "/api/books/search");
        ctx.expect("search without title", &request, bad.clone())
            .await;

        let request = book_request(ctx, HttpMethod::Post, "/api/books")
            .with_body(RequestBody::json(json!({"title": "Missing Required Fields"})));
        ctx.expect("create book missing fields", &request, bad).await;
        StepFlow::Continue
    })
}

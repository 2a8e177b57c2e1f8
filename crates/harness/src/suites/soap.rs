//! SOAP loan suite: the full loan lifecycle against the SOAP service.
//!
//! Requests carry the loan namespace; responses are inspected with the
//! namespace-insensitive extractor and pretty-printed to stdout. Value
//! claims (success flags, loan status) are layered on top of the status
//! assertions.

use std::time::Duration;

use libris_application::{resolve_id, Scenario, Step, StepContext, StepFlow, StepFuture};
use libris_domain::{Encoding, EndpointTarget, HttpMethod, RequestBody, RequestSpec, StatusExpectation};
use libris_infrastructure::Reporter;
use tracing::{info, warn};

const LOAN_NS: &str = "http://library.example.com/loan";

/// Builds the SOAP loan scenario.
#[must_use]
pub fn scenario(pacing: Duration) -> Scenario {
    Scenario::new(
        "soap loans",
        vec![
            Step::new("wsdl precondition", check_wsdl),
            Step::new("all loans before", all_loans_initial),
            Step::new("create loan", create_loan),
            Step::new("loan by id", loan_by_id),
            Step::new("loans by user", loans_by_user),
            Step::new("return loan", return_loan),
            Step::new("duplicate return", duplicate_return),
            Step::new("create multiple loans", create_multiple_loans),
            Step::new("all loans after", all_loans_final),
        ],
    )
    .with_pacing(pacing)
}

fn soap_request(ctx: &StepContext<'_>, payload: String) -> RequestSpec {
    RequestSpec::new(EndpointTarget::soap(&ctx.targets.loan_endpoint))
        .with_body(RequestBody::soap(payload))
}

fn print_response(body: Option<&str>) {
    if let Some(body) = body {
        let reporter = Reporter::new(colored::control::SHOULD_COLORIZE.should_colorize());
        println!("{}", reporter.render_xml(body));
    }
}

/// `(id, status)` of each `<loans>` entry in a listing response.
fn loan_entries(body: &str) -> Vec<(String, String)> {
    let Ok(document) = roxmltree::Document::parse(body) else {
        return Vec::new();
    };
    document
        .descendants()
        .filter(|node| node.tag_name().name() == "loans")
        .map(|loan| {
            let field = |name: &str| {
                loan.descendants()
                    .find(|child| child.tag_name().name() == name)
                    .and_then(|child| child.text())
                    .unwrap_or("?")
                    .to_string()
            };
            (field("id"), field("status"))
        })
        .collect()
}

fn check_wsdl<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let request = RequestSpec::new(EndpointTarget::rest(
            HttpMethod::Get,
            &ctx.targets.loan_endpoint,
            "?wsdl",
        ));
        let outcome = ctx
            .expect("wsdl available", &request, StatusExpectation::exact(200))
            .await;
        if outcome.status() == Some(200) {
            StepFlow::Continue
        } else {
            StepFlow::Fatal("loan service is not responding".to_string())
        }
    })
}

fn all_loans_initial<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let request = soap_request(
            ctx,
            format!("<getAllLoansRequest xmlns=\"{LOAN_NS}\"/>"),
        );
        let outcome = ctx.probe("all loans before", &request).await;
        if let Some(body) = outcome.body() {
            info!(loans = body.matches("<loans>").count(), "loans in system");
            print_response(Some(body));
        }
        StepFlow::Continue
    })
}

fn create_loan<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let request = soap_request(
            ctx,
            format!(
                "<createLoanRequest xmlns=\"{LOAN_NS}\">\
                 <userId>1</userId><bookId>1</bookId>\
                 </createLoanRequest>"
            ),
        );
        let outcome = ctx
            .expect("create loan", &request, StatusExpectation::exact(200))
            .await;

        let success = outcome.extract("success", Encoding::Xml);
        ctx.ledger
            .assert_field_eq("create loan", "success", "true", success.as_deref());
        let status = outcome.extract("status", Encoding::Xml);
        ctx.ledger
            .assert_field_eq("create loan status", "status", "ACTIVE", status.as_deref());

        if let Some(id) = outcome.extract("id", Encoding::Xml) {
            info!(loan_id = %id, "loan created");
            ctx.state.created_loan_id = Some(id);
        }
        print_response(outcome.body());
        StepFlow::Continue
    })
}

fn loan_by_id<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let stored = ctx.state.created_loan_id.clone();
        let (loan_id, tier) = resolve_id(stored, || async { None }, "1".to_string()).await;
        info!(%loan_id, %tier, "resolved lookup target");

        let request = soap_request(
            ctx,
            format!(
                "<getLoanByIdRequest xmlns=\"{LOAN_NS}\">\
                 <loanId>{loan_id}</loanId>\
                 </getLoanByIdRequest>"
            ),
        );
        let outcome = ctx
            .expect("loan by id", &request, StatusExpectation::exact(200))
            .await;

        let success = outcome.extract("success", Encoding::Xml);
        ctx.ledger
            .assert_field_eq("loan by id", "success", "true", success.as_deref());

        // The lifecycle loan was created for user 1 and book 1; the lookup
        // must return that same loan, not some other row.
        let user_id = outcome.extract("userId", Encoding::Xml);
        ctx.ledger
            .assert_field_eq("loan by id user", "userId", "1", user_id.as_deref());
        let book_id = outcome.extract("bookId", Encoding::Xml);
        ctx.ledger
            .assert_field_eq("loan by id book", "bookId", "1", book_id.as_deref());
        print_response(outcome.body());
        StepFlow::Continue
    })
}

fn loans_by_user<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let request = soap_request(
            ctx,
            format!(
                "<getLoansByUserRequest xmlns=\"{LOAN_NS}\">\
                 <userId>1</userId>\
                 </getLoansByUserRequest>"
            ),
        );
        let outcome = ctx.probe("loans by user", &request).await;
        if let Some(body) = outcome.body() {
            let entries = loan_entries(body);
            info!(loans = entries.len(), "loans held by user 1");
            for (id, status) in entries {
                info!(loan_id = %id, status = %status, "loan");
            }
            print_response(Some(body));
        }
        StepFlow::Continue
    })
}

fn return_loan<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let stored = ctx.state.created_loan_id.clone();
        let (loan_id, tier) = resolve_id(stored, || async { None }, "2".to_string()).await;
        info!(%loan_id, %tier, "resolved return target");
        ctx.state.returned_loan_id = Some(loan_id.clone());

        let request = soap_request(
            ctx,
            format!(
                "<returnLoanRequest xmlns=\"{LOAN_NS}\">\
                 <loanId>{loan_id}</loanId>\
                 </returnLoanRequest>"
            ),
        );
        let outcome = ctx
            .expect("return loan", &request, StatusExpectation::exact(200))
            .await;

        let success = outcome.extract("success", Encoding::Xml);
        ctx.ledger
            .assert_field_eq("return loan", "success", "true", success.as_deref());
        let status = outcome.extract("status", Encoding::Xml);
        ctx.ledger.assert_field_eq(
            "return loan status",
            "status",
            "RETURNED",
            status.as_deref(),
        );
        print_response(outcome.body());
        StepFlow::Continue
    })
}

fn duplicate_return<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let loan_id = ctx
            .state
            .returned_loan_id
            .clone()
            .unwrap_or_else(|| "2".to_string());

        let request = soap_request(
            ctx,
            format!(
                "<returnLoanRequest xmlns=\"{LOAN_NS}\">\
                 <loanId>{loan_id}</loanId>\
                 </returnLoanRequest>"
            ),
        );
        let outcome = ctx.probe("duplicate return", &request).await;

        // Rejection is the expected behavior here.
        let success = outcome.extract("success", Encoding::Xml);
        ctx.ledger.assert_field_eq(
            "duplicate return rejected",
            "success",
            "false",
            success.as_deref(),
        );
        print_response(outcome.body());
        StepFlow::Continue
    })
}

fn create_multiple_loans<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let users_request = RequestSpec::new(EndpointTarget::rest(
            HttpMethod::Get,
            &ctx.targets.user_base,
            "/api/users?limit=3",
        ));
        let users_outcome = ctx.dispatch(&users_request).await;
        let users = users_outcome
            .body()
            .map(super::data_ids)
            .unwrap_or_default();

        let books_request = RequestSpec::new(EndpointTarget::rest(
            HttpMethod::Get,
            &ctx.targets.book_base,
            "/api/books?limit=4",
        ));
        let books_outcome = ctx.dispatch(&books_request).await;
        let books = books_outcome
            .body()
            .map(super::data_ids)
            .unwrap_or_default();

        if users.len() < 2 || books.len() < 3 {
            warn!(
                users = users.len(),
                books = books.len(),
                "not enough live data for multiple loans, need 2 users and 3 books"
            );
            ctx.ledger
                .assert_status("create multiple loans", None, &books_outcome);
            return StepFlow::Continue;
        }

        let combinations = [
            (users[0], books[1]),
            (users[1], books[2]),
            (users[0], if books.len() > 3 { books[3] } else { books[0] }),
        ];
        for (index, (user_id, book_id)) in combinations.into_iter().enumerate() {
            info!(user_id, book_id, "creating loan {}/3", index + 1);
            let request = soap_request(
                ctx,
                format!(
                    "<createLoanRequest xmlns=\"{LOAN_NS}\">\
                     <userId>{user_id}</userId><bookId>{book_id}</bookId>\
                     </createLoanRequest>"
                ),
            );
            let outcome = ctx
                .expect(
                    &format!("create loan {}/3", index + 1),
                    &request,
                    StatusExpectation::exact(200),
                )
                .await;
            let success = outcome.extract("success", Encoding::Xml);
            ctx.ledger.assert_field_eq(
                format!("create loan {}/3", index + 1),
                "success",
                "true",
                success.as_deref(),
            );
        }
        StepFlow::Continue
    })
}

fn all_loans_final<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
    Box::pin(async move {
        let request = soap_request(
            ctx,
            format!("<getAllLoansRequest xmlns=\"{LOAN_NS}\"/>"),
        );
        let outcome = ctx.probe("all loans after", &request).await;
        if let Some(body) = outcome.body() {
            info!(
                total = body.matches("<loans>").count(),
                active = body.matches("<status>ACTIVE</status>").count(),
                returned = body.matches("<status>RETURNED</status>").count(),
                "final loan tallies"
            );
        }
        StepFlow::Continue
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_loan_entries_with_namespace() {
        let body = r#"<getLoansByUserResponse xmlns="http://library.example.com/loan">
            <success>true</success>
            <loans><id>4</id><status>ACTIVE</status></loans>
            <loans><id>7</id><status>RETURNED</status></loans>
        </getLoansByUserResponse>"#;
        assert_eq!(
            loan_entries(body),
            vec![
                ("4".to_string(), "ACTIVE".to_string()),
                ("7".to_string(), "RETURNED".to_string()),
            ]
        );
    }

    #[test]
    fn test_loan_entries_on_malformed_body() {
        assert!(loan_entries("<broken").is_empty());
    }
}

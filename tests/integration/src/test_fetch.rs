//! Fetch integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, proxy_url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_content_with_bounded_error() {
        let resp = client()
            .get(format!("{}/definitely-not-a-cid", proxy_url()))
            .send()
            .await
            .expect("fetch request");

        assert_eq!(resp.status(), 400);
        let body = resp.text().await.expect("response body");
        assert!(body.len() <= 200, "error body too long: {}", body.len());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_keep_serving_after_failures() {
        for _ in 0..3 {
            let resp = client()
                .get(format!("{}/definitely-not-a-cid", proxy_url()))
                .send()
                .await
                .expect("fetch request");
            assert_eq!(resp.status(), 400);
        }

        let resp = client()
            .post(proxy_url())
            .header("content-type", "text/plain")
            .body("still alive")
            .send()
            .await
            .expect("upload request");
        assert_eq!(resp.status(), 200);
    }
}

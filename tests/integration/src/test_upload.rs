//! Upload integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, proxy_url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_and_return_cid_path() {
        let resp = client()
            .post(proxy_url())
            .header("content-type", "text/plain")
            .body("hello, w3s-proxy!")
            .send()
            .await
            .expect("upload request");

        assert_eq!(resp.status(), 200);
        let body = resp.text().await.expect("response body");
        let (cid, name) = body.split_once('/').expect("cid/filename response");
        assert!(!cid.is_empty());
        assert_eq!(name, "w3s-proxy.txt");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fall_back_to_generic_extension() {
        let resp = client()
            .post(proxy_url())
            .body("opaque bytes")
            .send()
            .await
            .expect("upload request");

        assert_eq!(resp.status(), 200);
        let body = resp.text().await.expect("response body");
        assert!(body.ends_with("/w3s-proxy.b"), "unexpected body: {body}");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_uploaded_content() {
        let payload = "round-trip payload";
        let resp = client()
            .post(proxy_url())
            .header("content-type", "text/plain")
            .body(payload)
            .send()
            .await
            .expect("upload request");
        assert_eq!(resp.status(), 200);

        let body = resp.text().await.expect("response body");
        let (cid, _name) = body.split_once('/').expect("cid/filename response");

        // Subject to backend consistency; the gateway may take a moment to
        // see freshly pinned content.
        let fetched = client()
            .get(format!("{}/{cid}", proxy_url()))
            .send()
            .await
            .expect("fetch request");
        assert_eq!(fetched.status(), 200);
        let fetched_body = fetched.bytes().await.expect("fetched body");
        assert_eq!(fetched_body.as_ref(), payload.as_bytes());
    }
}

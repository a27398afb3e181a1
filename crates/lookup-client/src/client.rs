//! Lookup client
//!
//! [`Client`] maps lookups onto HTTP exchanges: one GET per single lookup,
//! one POST per batch, then writes the deserialized results back onto the
//! lookups in order.

use networking::{Request, Sender};
use std::fmt;

use crate::{Batch, Deserializer, Error, Lookup, Result, Serializer, MAX_BATCH_SIZE};

/// Client sending lookups through a sender chain
///
/// The client performs no retry of its own and never swallows a failure;
/// retrying belongs to the sender chain.
pub struct Client<Ser, De> {
    url_prefix: String,
    sender: Box<dyn Sender>,
    serializer: Ser,
    deserializer: De,
    max_candidates: Option<u32>,
    batch_capacity: usize,
}

impl<Ser, De> fmt::Debug for Client<Ser, De> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url_prefix", &self.url_prefix)
            .field("max_candidates", &self.max_candidates)
            .field("batch_capacity", &self.batch_capacity)
            .finish_non_exhaustive()
    }
}

impl<Ser: Serializer, De: Deserializer> Client<Ser, De> {
    /// Create a client over a sender chain
    pub fn new(
        url_prefix: impl Into<String>,
        sender: impl Sender + 'static,
        serializer: Ser,
        deserializer: De,
    ) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            sender: Box::new(sender),
            serializer,
            deserializer,
            max_candidates: None,
            batch_capacity: MAX_BATCH_SIZE,
        }
    }

    /// Set the candidate limit applied to lookups that have none of their own
    pub fn with_max_candidates(mut self, max: u32) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Set the capacity of batches created by [`Client::new_batch`]
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Get the default candidate limit
    pub fn max_candidates(&self) -> Option<u32> {
        self.max_candidates
    }

    /// Create an empty batch with the configured capacity
    pub fn new_batch(&self) -> Batch<De::Output> {
        Batch::with_capacity(self.batch_capacity)
    }

    /// Get the URL requests are sent to
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Get the serializer
    pub fn serializer(&self) -> &Ser {
        &self.serializer
    }

    /// Get the deserializer
    pub fn deserializer(&self) -> &De {
        &self.deserializer
    }

    /// Send a single lookup as a GET request
    ///
    /// The lookup's fields become query parameters ordered by name. An empty
    /// result list means the service found no match: the call succeeds and
    /// the lookup's result slot is left empty. A single result is assigned
    /// to the lookup.
    pub async fn send_lookup(&self, lookup: &mut Lookup<De::Output>) -> Result<()> {
        self.apply_defaults(lookup);
        let request = lookup
            .parameters()
            .into_iter()
            .fold(Request::get(self.url_prefix.as_str()), |request, (name, value)| {
                request.param(name, value)
            });

        let mut results = self.dispatch(request).await?;
        match results.len() {
            0 => {
                tracing::debug!("no match for lookup");
                lookup.clear_result();
            }
            1 => {
                if let Some(result) = results.pop() {
                    lookup.set_result(result);
                }
            }
            actual => {
                return Err(Error::ResultCountMismatch {
                    expected: 1,
                    actual,
                })
            }
        }
        Ok(())
    }

    /// Send a batch of lookups as one POST request
    ///
    /// An empty batch is not sent. Otherwise `results[i]` is assigned to
    /// `batch[i]` once the result count has been checked against the batch
    /// size; on any failure no result is touched.
    pub async fn send_batch(&self, batch: &mut Batch<De::Output>) -> Result<()> {
        if batch.is_empty() {
            tracing::debug!("empty batch, nothing to send");
            return Ok(());
        }

        for lookup in batch.iter_mut() {
            self.apply_defaults(lookup);
        }
        let payload = self.serializer.serialize(batch.lookups())?;
        let request = Request::post(self.url_prefix.as_str(), payload)
            .header("Content-Type", self.serializer.content_type());

        tracing::debug!(lookups = batch.len(), "sending batch");
        let results = self.dispatch(request).await?;
        if results.len() != batch.len() {
            return Err(Error::ResultCountMismatch {
                expected: batch.len(),
                actual: results.len(),
            });
        }

        for (lookup, result) in batch.iter_mut().zip(results) {
            lookup.set_result(result);
        }
        Ok(())
    }

    fn apply_defaults(&self, lookup: &mut Lookup<De::Output>) {
        if let (None, Some(max)) = (lookup.candidate_limit(), self.max_candidates) {
            lookup.set_max_candidates(max);
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Vec<De::Output>> {
        let response = self.sender.send(request).await?;

        if response.status() >= 400 {
            return Err(Error::Service {
                status: response.status(),
                message: String::from_utf8_lossy(response.payload()).into_owned(),
            });
        }

        let results = self.deserializer.deserialize(response.payload())?;
        tracing::debug!(results = results.len(), "results received");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        FailingSender, FakeDeserializer, FakeSerializer, MockSender, RequestCapturingSender,
    };
    use crate::JsonSerializer;
    use networking::{HttpMethod, Response};
    use std::sync::Arc;

    type TestClient = Client<FakeSerializer, FakeDeserializer<String>>;

    fn client_with(sender: impl Sender + 'static, results: Vec<String>) -> TestClient {
        Client::new(
            "http://localhost/",
            sender,
            FakeSerializer::new(b"Hello, world!".to_vec()),
            FakeDeserializer::new(results),
        )
    }

    // =========================================================================
    // Single Lookup
    // =========================================================================

    #[tokio::test]
    async fn test_sending_single_zip_only_lookup() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = client_with(Arc::clone(&sender), vec!["r".to_string()]);

        client.send_lookup(&mut Lookup::new().field("zipcode", "1")).await.unwrap();

        let request = sender.last_request().unwrap();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.url(), "http://localhost/?zipcode=1");
    }

    #[tokio::test]
    async fn test_sending_single_fully_populated_lookup() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = client_with(Arc::clone(&sender), vec!["r".to_string()]);
        let mut lookup = Lookup::new()
            .field("City", "1")
            .field("State", "2")
            .field("ZipCode", "3");

        client.send_lookup(&mut lookup).await.unwrap();

        assert_eq!(
            sender.last_request().unwrap().url(),
            "http://localhost/?city=1&state=2&zipcode=3"
        );
    }

    #[tokio::test]
    async fn test_single_lookup_includes_candidates() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = client_with(Arc::clone(&sender), vec!["r".to_string()]);
        let mut lookup = Lookup::new().field("street", "1 Main").max_candidates(5);

        client.send_lookup(&mut lookup).await.unwrap();

        assert_eq!(
            sender.last_request().unwrap().url(),
            "http://localhost/?candidates=5&street=1%20Main"
        );
    }

    #[tokio::test]
    async fn test_deserialize_called_with_response_body() {
        let sender = MockSender::new(Response::new(200, b"Hello, world!".to_vec()));
        let client = client_with(sender, vec!["r".to_string()]);

        client.send_lookup(&mut Lookup::new()).await.unwrap();

        assert_eq!(client.deserializer().payloads(), vec![b"Hello, world!".to_vec()]);
    }

    #[tokio::test]
    async fn test_result_assigned_to_single_lookup() {
        let client = client_with(RequestCapturingSender::new(), vec!["candidate".to_string()]);
        let mut lookup = Lookup::new().field("zipcode", "84604");

        client.send_lookup(&mut lookup).await.unwrap();

        assert_eq!(lookup.result(), Some(&"candidate".to_string()));
    }

    #[tokio::test]
    async fn test_no_results_means_no_match() {
        let client = client_with(RequestCapturingSender::new(), Vec::new());
        let mut lookup = Lookup::new().field("street", "nowhere");
        lookup.set_result("stale".to_string());

        client.send_lookup(&mut lookup).await.unwrap();

        assert!(lookup.result().is_none());
    }

    #[tokio::test]
    async fn test_empty_json_answers_are_no_match() {
        for body in [&b"[]"[..], &b""[..]] {
            let client = Client::new(
                "http://localhost/",
                MockSender::new(Response::new(200, body.to_vec())),
                JsonSerializer,
                crate::JsonDeserializer::<serde_json::Value>::new(),
            );
            let mut lookup = Lookup::new().field("zipcode", "00000");

            client.send_lookup(&mut lookup).await.unwrap();

            assert!(lookup.result().is_none());
        }
    }

    #[tokio::test]
    async fn test_default_max_candidates_applied() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = client_with(Arc::clone(&sender), vec!["r".to_string()]).with_max_candidates(3);

        client.send_lookup(&mut Lookup::new().field("street", "1 Main")).await.unwrap();
        assert_eq!(
            sender.last_request().unwrap().url(),
            "http://localhost/?candidates=3&street=1%20Main"
        );

        let mut own_limit = Lookup::new().field("street", "1 Main").max_candidates(7);
        client.send_lookup(&mut own_limit).await.unwrap();
        assert_eq!(
            sender.last_request().unwrap().url(),
            "http://localhost/?candidates=7&street=1%20Main"
        );
    }

    // =========================================================================
    // Batch Lookup
    // =========================================================================

    #[tokio::test]
    async fn test_empty_batch_not_sent() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = client_with(Arc::clone(&sender), Vec::new());

        client.send_batch(&mut Batch::new()).await.unwrap();

        assert!(sender.last_request().is_none());
        assert!(client.deserializer().payloads().is_empty());
    }

    #[tokio::test]
    async fn test_successfully_sends_batch_of_lookups() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = client_with(Arc::clone(&sender), vec!["a".to_string(), "b".to_string()]);
        let mut batch = Batch::new();
        batch.add(Lookup::new()).unwrap();
        batch.add(Lookup::new()).unwrap();

        client.send_batch(&mut batch).await.unwrap();

        let request = sender.last_request().unwrap();
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.payload_bytes(), Some(&b"Hello, world!"[..]));
        assert_eq!(
            request.headers().get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(sender.request_count(), 1);
    }

    #[tokio::test]
    async fn test_candidates_correctly_assigned_to_corresponding_lookup() {
        let expected = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        let client = client_with(MockSender::new(Response::new(200, Vec::new())), expected.clone());
        let mut batch = Batch::new();
        for _ in 0..expected.len() {
            batch.add(Lookup::new()).unwrap();
        }

        client.send_batch(&mut batch).await.unwrap();

        for (i, result) in expected.iter().enumerate() {
            assert_eq!(batch[i].result(), Some(result));
        }
    }

    #[tokio::test]
    async fn test_result_count_mismatch_leaves_batch_untouched() {
        let client = client_with(RequestCapturingSender::new(), vec!["only one".to_string()]);
        let mut batch = Batch::new();
        batch.add(Lookup::new()).unwrap();
        batch.add(Lookup::new()).unwrap();

        let err = client.send_batch(&mut batch).await.unwrap_err();

        assert!(matches!(err, Error::ResultCountMismatch { expected: 2, actual: 1 }));
        assert!(batch.iter().all(|lookup| lookup.result().is_none()));
    }

    #[test]
    fn test_new_batch_uses_configured_capacity() {
        let client = client_with(RequestCapturingSender::new(), Vec::new()).with_batch_capacity(2);
        let mut batch = client.new_batch();

        batch.add(Lookup::new()).unwrap();
        batch.add(Lookup::new()).unwrap();

        assert!(matches!(batch.add(Lookup::new()), Err(Error::BatchFull { capacity: 2 })));

        let default_client = client_with(RequestCapturingSender::new(), Vec::new());
        assert_eq!(default_client.new_batch().capacity(), MAX_BATCH_SIZE);
    }

    #[tokio::test]
    async fn test_batch_with_no_results_is_a_mismatch() {
        let client = client_with(RequestCapturingSender::new(), Vec::new());
        let mut batch = Batch::new();
        batch.add(Lookup::new()).unwrap();

        let err = client.send_batch(&mut batch).await.unwrap_err();

        assert!(matches!(err, Error::ResultCountMismatch { expected: 1, actual: 0 }));
    }

    #[tokio::test]
    async fn test_too_many_results_is_a_mismatch() {
        let client = client_with(RequestCapturingSender::new(), vec!["a".to_string(), "b".to_string()]);

        let err = client.send_lookup(&mut Lookup::new()).await.unwrap_err();

        assert!(matches!(err, Error::ResultCountMismatch { expected: 1, actual: 2 }));
    }

    #[tokio::test]
    async fn test_batch_payload_from_json_serializer() {
        let sender = Arc::new(RequestCapturingSender::new());
        let client = Client::new(
            "http://localhost/",
            Arc::clone(&sender),
            JsonSerializer,
            FakeDeserializer::new(vec!["a".to_string()]),
        );
        let mut batch = Batch::new();
        batch.add(Lookup::new().field("street", "1 Infinite Loop").field("zipcode", "95014")).unwrap();

        client.send_batch(&mut batch).await.unwrap();

        assert_eq!(
            sender.last_request().unwrap().payload_bytes(),
            Some(&br#"[{"street":"1 Infinite Loop","zipcode":"95014"}]"#[..])
        );
    }

    // =========================================================================
    // Response Handling
    // =========================================================================

    #[tokio::test]
    async fn test_error_status_is_service_error() {
        let sender = MockSender::new(Response::new(401, b"Unauthorized".to_vec()));
        let client = client_with(sender, vec!["r".to_string()]);
        let mut lookup = Lookup::new();

        let err = client.send_lookup(&mut lookup).await.unwrap_err();

        assert!(matches!(err, Error::Service { status: 401, ref message } if message == "Unauthorized"));
        assert!(lookup.result().is_none());
        assert!(client.deserializer().payloads().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_unchanged() {
        let client = client_with(FailingSender::always(), vec!["r".to_string()]);

        let err = client.send_lookup(&mut Lookup::new()).await.unwrap_err();

        assert!(err.is_transport_failure());
        assert!(matches!(err, Error::Transport(networking::Error::Io(_))));
    }

    #[tokio::test]
    async fn test_client_does_not_retry() {
        let sender = Arc::new(FailingSender::new(1));
        let client = client_with(Arc::clone(&sender), vec!["r".to_string()]);

        assert!(client.send_lookup(&mut Lookup::new()).await.is_err());
        assert_eq!(sender.calls(), 1);
    }

    #[tokio::test]
    async fn test_deserialization_failure_propagates() {
        let client = Client::new(
            "http://localhost/",
            MockSender::new(Response::new(200, b"not valid json".to_vec())),
            FakeSerializer::new(Vec::new()),
            crate::JsonDeserializer::<Vec<String>>::new(),
        );

        let err = client.send_lookup(&mut Lookup::new()).await.unwrap_err();

        assert!(matches!(err, Error::Deserialization(_)));
    }
}

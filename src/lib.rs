//! Streetwise address lookup SDK
//!
//! Re-exports the two layers of the SDK: [`networking`] holds the
//! request-dispatch pipeline and [`lookup_client`] the lookup client built on
//! top of it. Most programs only need the client side:
//!
//! ```no_run
//! use streetwise::{ClientBuilder, Lookup, StaticCredentials};
//!
//! # async fn example() -> streetwise::Result<()> {
//! let client = ClientBuilder::new("https://us-zipcode.api.example.com/lookup")
//!     .with_credentials(StaticCredentials::new("auth-id", "auth-token"))
//!     .build_json::<serde_json::Value>()?;
//!
//! let mut lookup = Lookup::new().field("city", "Provo").field("state", "UT");
//! client.send_lookup(&mut lookup).await?;
//! # Ok(())
//! # }
//! ```

pub use lookup_client;
pub use networking;

pub use lookup_client::{
    Batch, BlockingClient, Client, ClientBuilder, Deserializer, Error, JsonDeserializer,
    JsonSerializer, Lookup, Result, Serializer, MAX_BATCH_SIZE,
};
pub use networking::{
    DefaultRetryPolicy, ProxyConfig, RetryConfig, RetryPolicy, Sender, SharedCredentials,
    Signer, StaticCredentials,
};

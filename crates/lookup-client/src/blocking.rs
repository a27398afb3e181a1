//! Blocking client
//!
//! [`BlockingClient`] runs the async [`Client`] on a private current-thread
//! runtime. Creating one from inside an async runtime fails with
//! [`networking::Error::NestedRuntime`].

use tokio::runtime::{Builder, Handle, Runtime};

use crate::{Batch, Client, Deserializer, Lookup, Result, Serializer};

/// Blocking adapter over [`Client`]
///
/// # Examples
/// ```no_run
/// use lookup_client::{BlockingClient, ClientBuilder, Lookup};
///
/// # fn example() -> lookup_client::Result<()> {
/// let client = ClientBuilder::new("https://us-zipcode.api.example.com/lookup")
///     .build_json::<serde_json::Value>()?;
/// let client = BlockingClient::new(client)?;
///
/// let mut lookup = Lookup::new().field("zipcode", "84604");
/// client.send_lookup(&mut lookup)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BlockingClient<Ser, De> {
    inner: Client<Ser, De>,
    runtime: Runtime,
}

impl<Ser: Serializer, De: Deserializer> BlockingClient<Ser, De> {
    /// Wrap an async client
    pub fn new(inner: Client<Ser, De>) -> Result<Self> {
        if Handle::try_current().is_ok() {
            return Err(networking::Error::NestedRuntime.into());
        }
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(networking::Error::from)?;
        Ok(Self { inner, runtime })
    }

    /// Send a single lookup, blocking until it completes
    pub fn send_lookup(&self, lookup: &mut Lookup<De::Output>) -> Result<()> {
        self.runtime.block_on(self.inner.send_lookup(lookup))
    }

    /// Send a batch of lookups, blocking until it completes
    pub fn send_batch(&self, batch: &mut Batch<De::Output>) -> Result<()> {
        self.runtime.block_on(self.inner.send_batch(batch))
    }

    /// Get the wrapped client
    pub fn inner(&self) -> &Client<Ser, De> {
        &self.inner
    }
}

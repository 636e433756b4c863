//! Handler responses.
//!
//! A [`Response`] carries two independent control flags plus up to two value
//! slots. Slots a channel does not use are `()`, so a ping handler has no
//! payload it could try to rewrite and only the approval channel can express
//! an admission decision.
//!
//! | Channel               | Shape                   |
//! |-----------------------|-------------------------|
//! | ping, query           | [`SignalResponse`]      |
//! | packet, status change | [`PacketResponse<M>`]   |
//! | connection approval   | [`ApprovalResponse<M>`] |

/// Result of one handler, and of a whole channel dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<T = (), S = ()> {
    /// Keep invoking the remaining handlers of this channel
    pub continue_plugins: bool,
    /// Let the server run its own handling once the chain is done
    pub continue_server: bool,
    /// Message seen by later handlers and by the server
    pub payload: T,
    /// Side value; the admit flag on the approval channel
    pub secondary: S,
}

/// Response of channels with nothing to rewrite.
pub type SignalResponse = Response;

/// Response of channels whose payload handlers may rewrite.
pub type PacketResponse<M> = Response<M>;

/// Response of the connection-approval channel. `secondary` is the admit flag.
pub type ApprovalResponse<M> = Response<M, bool>;

impl Default for Response {
    fn default() -> Self {
        Self::proceed()
    }
}

impl Response {
    /// Let everyone continue.
    pub const fn proceed() -> Self {
        Self {
            continue_plugins: true,
            continue_server: true,
            payload: (),
            secondary: (),
        }
    }
}

impl<T> Response<T> {
    /// Pass `payload` on to the next handler and the server.
    pub const fn forward(payload: T) -> Self {
        Self {
            continue_plugins: true,
            continue_server: true,
            payload,
            secondary: (),
        }
    }
}

impl<T> Response<T, bool> {
    /// Pass `payload` on and admit the connection.
    pub const fn admit(payload: T) -> Self {
        Self {
            continue_plugins: true,
            continue_server: true,
            payload,
            secondary: true,
        }
    }

    /// Pass `payload` on and reject the connection.
    pub const fn deny(payload: T) -> Self {
        Self {
            continue_plugins: true,
            continue_server: true,
            payload,
            secondary: false,
        }
    }

    /// Set the admission decision.
    #[must_use]
    pub fn admitted(mut self, admit: bool) -> Self {
        self.secondary = admit;
        self
    }

    #[inline]
    pub fn is_admitted(&self) -> bool {
        self.secondary
    }
}

impl<T, S> Response<T, S> {
    /// Stop the chain here. This response becomes the channel's result.
    #[must_use]
    pub fn stop_plugins(mut self) -> Self {
        self.continue_plugins = false;
        self
    }

    /// Skip the server's built-in handling for this packet.
    #[must_use]
    pub fn stop_server(mut self) -> Self {
        self.continue_server = false;
        self
    }

    /// Replace the payload, keeping flags and secondary value.
    #[must_use]
    pub fn with_payload<U>(self, payload: U) -> Response<U, S> {
        Response {
            continue_plugins: self.continue_plugins,
            continue_server: self.continue_server,
            payload,
            secondary: self.secondary,
        }
    }

    #[inline]
    pub fn should_continue_plugins(&self) -> bool {
        self.continue_plugins
    }

    #[inline]
    pub fn should_continue_server(&self) -> bool {
        self.continue_server
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

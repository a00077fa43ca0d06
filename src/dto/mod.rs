/// Channel response body.
pub mod channel;
/// Health response body.
pub mod health;
/// Player request and response bodies.
pub mod player;
/// Field validators shared by the request bodies.
pub mod validation;

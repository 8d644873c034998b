use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, Instrument};

#[async_trait]
pub trait Actor: Send + 'static {
    type Message: Send;
    type Response: Send;

    async fn handle_message(&mut self, message: Self::Message) -> Self::Response;
}

#[derive(thiserror::Error, Debug)]
pub enum ActorError {
    #[error("the actor has stopped")]
    Stopped,
}

pub struct ActorHandle<T: Actor> {
    message_sender: mpsc::Sender<MessageWrap<T::Message, T::Response>>,
}

impl<T: Actor> Clone for ActorHandle<T> {
    fn clone(&self) -> Self {
        ActorHandle {
            message_sender: self.message_sender.clone(),
        }
    }
}

impl<T: Actor> ActorHandle<T> {
    pub fn new(
        message_sender: mpsc::Sender<MessageWrap<T::Message, T::Response>>,
    ) -> ActorHandle<T> {
        ActorHandle { message_sender }
    }

    /// Runs the actor on its own task. Messages are handled one at a time in
    /// the order they were sent.
    pub fn spawn(mut actor: T, buffer: usize) -> ActorHandle<T> {
        let (message_sender, mut message_receiver) =
            mpsc::channel::<MessageWrap<T::Message, T::Response>>(buffer);

        tokio::spawn(
            async move {
                while let Some(MessageWrap {
                    message,
                    respond_to,
                }) = message_receiver.recv().await
                {
                    let response = actor.handle_message(message).await;
                    // The sender may have given up waiting, that's fine.
                    let _ = respond_to.send(response);
                }

                debug!("All actor handles dropped, stopping");
            }
            .instrument(tracing::debug_span!("actor", kind = std::any::type_name::<T>())),
        );

        ActorHandle::new(message_sender)
    }
}

impl<T: Actor> ActorHandle<T> {
    pub async fn send(&self, message: T::Message) -> Result<T::Response, ActorError> {
        let (response_sender, response_receiver) = oneshot::channel();

        self.message_sender
            .send(MessageWrap {
                message,
                respond_to: response_sender,
            })
            .await
            .map_err(|_| ActorError::Stopped)?;

        response_receiver.await.map_err(|_| ActorError::Stopped)
    }
}

pub struct MessageWrap<M: Send, R: Send> {
    pub message: M,
    pub respond_to: oneshot::Sender<R>,
}

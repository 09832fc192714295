//! # Link Client
//!
//! Executes the console's requests over HTTP on worker threads so that the control thread never
//! waits on the network. There is one worker for the vehicle service, which handles one request
//! at a time in the order they were raised, and one for the routing service.
//!
//! When drive commands queue up behind a slow request only the newest is sent, the rest are
//! answered with [`LinkReply::Superseded`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::mpsc::{channel, Receiver, SendError, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use comms_if::{
    net::{get_json, post_ack, post_json, HttpTransport, NetParams, TransportError},
    routing::{route_url, RouteResponse},
};
use log::{debug, trace, warn};

use crate::outbox::{LinkReply, LinkRequest, LinkResult, RequestId};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct LinkClient {
    vehicle_sender: Sender<WorkerSignal>,
    routing_sender: Sender<WorkerSignal>,

    reply_reciever: Receiver<(RequestId, LinkResult)>,

    worker_jhs: Vec<JoinHandle<Result<(), LinkError>>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
enum WorkerSignal {
    /// The worker should stop once the requests it already has are done
    Stop,

    /// Requests to execute, oldest first
    Requests(Vec<(RequestId, LinkRequest)>),
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Could not start the {0} worker thread: {1}")]
    WorkerStartError(&'static str, std::io::Error),

    #[error("The {0} worker thread has stopped")]
    WorkerStopped(&'static str),

    #[error("Could not return a reply to the control thread")]
    ReplySendError,

    #[error("The {0} worker thread panicked")]
    WorkerPanicked(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LinkClient {
    /// Start the worker threads, each with its own copy of the transport.
    pub fn new<T>(transport: T, net: &NetParams) -> Result<Self, LinkError>
    where
        T: HttpTransport + Clone + 'static,
    {
        let (reply_sender, reply_reciever) = channel();

        let (vehicle_sender, vehicle_jh) =
            spawn_worker("vehicle", transport.clone(), net.clone(), reply_sender.clone())?;
        let (routing_sender, routing_jh) =
            spawn_worker("routing", transport, net.clone(), reply_sender)?;

        Ok(Self {
            vehicle_sender,
            routing_sender,
            reply_reciever,
            worker_jhs: vec![vehicle_jh, routing_jh],
        })
    }

    /// Hand requests to the workers.
    pub fn send(&self, requests: Vec<(RequestId, LinkRequest)>) -> Result<(), LinkError> {
        let (routing, vehicle): (Vec<_>, Vec<_>) =
            requests.into_iter().partition(|(_, r)| r.is_routing());

        if !vehicle.is_empty() {
            self.vehicle_sender
                .send(WorkerSignal::Requests(vehicle))
                .map_err(|_| LinkError::WorkerStopped("vehicle"))?;
        }
        if !routing.is_empty() {
            self.routing_sender
                .send(WorkerSignal::Requests(routing))
                .map_err(|_| LinkError::WorkerStopped("routing"))?;
        }

        Ok(())
    }

    /// Collect every reply that has arrived since the last call, without blocking.
    pub fn recieve_replies(&self) -> Vec<(RequestId, LinkResult)> {
        let mut replies = Vec::new();

        loop {
            match self.reply_reciever.try_recv() {
                Ok(r) => replies.push(r),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("All link workers have stopped");
                    break;
                }
            }
        }

        replies
    }

    /// Stop the workers and wait for them to finish their current requests.
    pub fn shutdown(self) -> Result<(), LinkError> {
        // A worker that already stopped has nothing left to do
        self.vehicle_sender.send(WorkerSignal::Stop).ok();
        self.routing_sender.send(WorkerSignal::Stop).ok();

        for (name, jh) in ["vehicle", "routing"].iter().zip(self.worker_jhs) {
            jh.join().map_err(|_| LinkError::WorkerPanicked(*name))??;
        }

        Ok(())
    }
}

impl<T> From<SendError<T>> for LinkError {
    fn from(_: SendError<T>) -> Self {
        LinkError::ReplySendError
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Perform one request and decode its reply.
pub fn execute(transport: &dyn HttpTransport, net: &NetParams, request: &LinkRequest) -> LinkResult {
    trace!("Executing {} request", request.name());

    match request {
        LinkRequest::GetLocation => {
            get_json(transport, &net.vehicle_url("location")).map(LinkReply::Location)
        }
        LinkRequest::GetState => get_json(transport, &net.vehicle_url("state")).map(LinkReply::State),
        LinkRequest::Control(c) => {
            post_ack(transport, &net.vehicle_url("control"), Some(c)).map(|_| LinkReply::Ack)
        }
        LinkRequest::SetMode(m) => {
            post_json(transport, &net.vehicle_url("mode"), m).map(LinkReply::Status)
        }
        LinkRequest::Config(c) => {
            post_ack(transport, &net.vehicle_url("config"), Some(c)).map(|_| LinkReply::Ack)
        }
        LinkRequest::Navigate(n) => {
            post_json(transport, &net.vehicle_url("navigate"), n).map(LinkReply::Status)
        }
        LinkRequest::Stop => {
            post_ack::<()>(transport, &net.vehicle_url("stop"), None).map(|_| LinkReply::Ack)
        }
        LinkRequest::Route {
            origin,
            destination,
        } => route_reply(get_json(
            transport,
            &route_url(&net.routing_endpoint, *origin, *destination),
        )),
    }
}

/// Turn the routing service's answer into a reply.
///
/// The router reports a failed route with a 4xx status and a normal routing body carrying the
/// failure code. Such a body is passed on as a [`LinkReply::Route`] so the failure is reported as
/// no route found rather than an unreachable service.
fn route_reply(result: Result<RouteResponse, TransportError>) -> LinkResult {
    match result {
        Ok(resp) => Ok(LinkReply::Route(resp)),
        Err(TransportError::HttpStatus(url, status, body)) if (400..500).contains(&status) => {
            match serde_json::from_slice::<RouteResponse>(&body) {
                Ok(resp) => {
                    debug!("Router answered HTTP {} with code {}", status, resp.code);
                    Ok(LinkReply::Route(resp))
                }
                Err(_) => Err(TransportError::HttpStatus(url, status, body)),
            }
        }
        Err(e) => Err(e),
    }
}

/// Drop every drive command but the newest from a batch.
///
/// Returns the ids of the dropped commands and the requests left to execute, in their original
/// order.
pub fn coalesce(
    batch: Vec<(RequestId, LinkRequest)>,
) -> (Vec<RequestId>, Vec<(RequestId, LinkRequest)>) {
    let last_control = batch
        .iter()
        .rposition(|(_, r)| matches!(r, LinkRequest::Control(_)));

    let mut superseded = Vec::new();
    let mut keep = Vec::with_capacity(batch.len());

    for (i, (id, request)) in batch.into_iter().enumerate() {
        match (&request, last_control) {
            (LinkRequest::Control(_), Some(last)) if i < last => superseded.push(id),
            _ => keep.push((id, request)),
        }
    }

    (superseded, keep)
}

fn spawn_worker<T>(
    name: &'static str,
    transport: T,
    net: NetParams,
    reply_sender: Sender<(RequestId, LinkResult)>,
) -> Result<(Sender<WorkerSignal>, JoinHandle<Result<(), LinkError>>), LinkError>
where
    T: HttpTransport + 'static,
{
    let (sender, reciever) = channel();

    let jh = thread::Builder::new()
        .name(format!("link_{}", name))
        .spawn(move || worker_thread(transport, net, reciever, reply_sender))
        .map_err(|e| LinkError::WorkerStartError(name, e))?;

    Ok((sender, jh))
}

fn worker_thread<T: HttpTransport>(
    transport: T,
    net: NetParams,
    reciever: Receiver<WorkerSignal>,
    reply_sender: Sender<(RequestId, LinkResult)>,
) -> Result<(), LinkError> {
    while let Ok(signal) = reciever.recv() {
        let mut batch = match signal {
            WorkerSignal::Stop => break,
            WorkerSignal::Requests(r) => r,
        };

        // Pick up anything queued while the last batch was running
        let mut stop = false;
        loop {
            match reciever.try_recv() {
                Ok(WorkerSignal::Requests(r)) => batch.extend(r),
                Ok(WorkerSignal::Stop) => {
                    stop = true;
                    break;
                }
                Err(_) => break,
            }
        }

        let (superseded, batch) = coalesce(batch);
        if !superseded.is_empty() {
            debug!("{} drive commands superseded", superseded.len());
        }
        for id in superseded {
            reply_sender.send((id, Ok(LinkReply::Superseded)))?;
        }

        for (id, request) in batch {
            let result = execute(&transport, &net, &request);
            reply_sender.send((id, result))?;
        }

        if stop {
            break;
        }
    }

    Ok(())
}

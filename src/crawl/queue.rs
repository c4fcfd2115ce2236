// src/crawl/queue.rs
// =============================================================================
// The crawl frontier: which URLs are still waiting to be fetched.
//
// How it works:
// 1. Start with the site's base URL in a queue
// 2. dequeue_next() pops the oldest URL and marks it visited right away
// 3. enqueue_if_new() only accepts URLs never seen before (neither visited
//    nor already waiting), so the queue can't blow up when every page links
//    to the same navigation menu
// 4. Crawling stops when the queue is empty or the page cap is reached
//
// Rust concepts:
// - HashSet: To track visited/pending URLs (O(1) lookup)
// - VecDeque: Double-ended queue for breadth-first crawling
// =============================================================================

use std::collections::{HashSet, VecDeque};

#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<String>,
    pending: HashSet<String>,
    visited: HashSet<String>,
    processed: usize,
    max_pages: usize,
}

impl Frontier {
    /// A frontier seeded with `start_url`
    pub fn new(start_url: impl Into<String>, max_pages: usize) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            pending: HashSet::new(),
            visited: HashSet::new(),
            processed: 0,
            max_pages,
        };
        frontier.enqueue_if_new(start_url.into());
        frontier
    }

    /// Pops the next URL in FIFO order, or None when the crawl should stop.
    ///
    /// The URL is marked visited (and counted against the page cap) before it
    /// is returned, so it can never be queued again during this crawl.
    pub fn dequeue_next(&mut self) -> Option<String> {
        if self.processed >= self.max_pages {
            return None;
        }

        while let Some(url) = self.queue.pop_front() {
            self.pending.remove(&url);
            if self.visited.insert(url.clone()) {
                self.processed += 1;
                return Some(url);
            }
        }
        None
    }

    /// Queues `url` unless it was already visited or is already waiting.
    /// Returns true when the URL was added.
    pub fn enqueue_if_new(&mut self, url: String) -> bool {
        if self.visited.contains(&url) || self.pending.contains(&url) {
            return false;
        }
        self.pending.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// URLs handed out so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn cap_reached(&self) -> bool {
        self.processed >= self.max_pages
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why both `pending` and `queue`?
//    - VecDeque keeps the order (first in, first out)
//    - HashSet answers "is it already queued?" without scanning the deque
//
// 2. What does HashSet::insert return?
//    - true if the value was not there yet, false otherwise
//    - dequeue_next() uses that to mark and test in one step
// -----------------------------------------------------------------------------

// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deferred insertion of nodes into the tree.
//!
//! Element and comment insertions are queued as [`AttachmentTask`]s and run
//! by the driver once the current token is processed. Running a task can
//! hand control to a [`ScriptHost`], which may mutate the tree; every later
//! task re-validates its nodes before touching them and is skipped if they
//! were invalidated.

use std::mem;

use crate::dom::{Document, NodeId};

/// Insert `child` under `parent`, before `next_child` when given.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AttachmentTask {
    pub parent: NodeId,
    pub child: NodeId,
    pub next_child: Option<NodeId>,
    pub self_closing: bool,
}

impl AttachmentTask {
    pub fn append(parent: NodeId, child: NodeId) -> AttachmentTask {
        AttachmentTask {
            parent,
            child,
            next_child: None,
            self_closing: false,
        }
    }

    pub fn insert_before(parent: NodeId, child: NodeId, next_child: NodeId) -> AttachmentTask {
        AttachmentTask {
            next_child: Some(next_child),
            ..AttachmentTask::append(parent, child)
        }
    }
}

#[derive(Debug, Default)]
pub struct AttachmentQueue {
    tasks: Vec<AttachmentTask>,
}

impl AttachmentQueue {
    pub fn new() -> AttachmentQueue {
        AttachmentQueue::default()
    }

    pub fn push(&mut self, task: AttachmentTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<AttachmentTask> {
        self.tasks.iter()
    }

    /// The parent `child` is queued to be inserted under, if any.
    pub fn pending_parent(&self, child: NodeId) -> Option<NodeId> {
        self.tasks
            .iter()
            .rev()
            .find(|task| task.child == child)
            .map(|task| task.parent)
    }

    /// Take every pending task, leaving the queue empty.
    pub fn take(&mut self) -> Vec<AttachmentTask> {
        mem::take(&mut self.tasks)
    }
}

/// What script sees while it runs in the middle of a flush.
pub struct ScriptContext<'a> {
    document: &'a mut Document,
    queue: &'a mut AttachmentQueue,
}

impl<'a> ScriptContext<'a> {
    pub fn document(&self) -> &Document {
        self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.document
    }

    /// Queue more work. It runs on the next flush, not the current one.
    pub fn queue_attachment(&mut self, task: AttachmentTask) {
        self.queue.push(task);
    }
}

/// Synchronous script triggered by the parser inserting nodes.
pub trait ScriptHost {
    /// `node` was just inserted by the parser. The tree may be changed freely.
    fn node_inserted(&mut self, cx: &mut ScriptContext, node: NodeId) {
        let _ = (cx, node);
    }
}

/// A host that never runs script.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScripting;

impl ScriptHost for NoScripting {}

impl<F> ScriptHost for F
where
    F: FnMut(&mut ScriptContext, NodeId),
{
    fn node_inserted(&mut self, cx: &mut ScriptContext, node: NodeId) {
        self(cx, node)
    }
}

/// Why a task could not run.
fn invalidated(document: &Document, task: &AttachmentTask) -> Option<&'static str> {
    if !document.is_alive(task.parent) {
        return Some("parent was destroyed");
    }
    if !document.is_alive(task.child) {
        return Some("child was destroyed");
    }
    if document.parent(task.child).is_some() {
        return Some("child was inserted elsewhere");
    }
    match task.next_child {
        Some(next) if document.parent(next) != Some(task.parent) => {
            Some("next sibling was moved")
        },
        _ => None,
    }
}

/// Run one task. Returns whether the child was inserted.
pub fn execute_task<Host: ScriptHost>(
    document: &mut Document,
    queue: &mut AttachmentQueue,
    host: &mut Host,
    task: AttachmentTask,
) -> bool {
    if let Some(reason) = invalidated(document, &task) {
        warn!("skipping attachment of {:?}: {}", task.child, reason);
        return false;
    }

    let inserted = match task.next_child {
        Some(next) => document.insert_before(task.parent, task.child, next),
        None => document.append_child(task.parent, task.child),
    };
    if !inserted {
        warn!("skipping attachment of {:?}: invalid insertion", task.child);
        return false;
    }

    host.node_inserted(
        &mut ScriptContext {
            document: &mut *document,
            queue: &mut *queue,
        },
        task.child,
    );

    // Script may have removed the child again.
    if document.parent(task.child).is_some() && document.is_connected(task.parent) {
        document.mark_attached(task.child);
    }
    if task.self_closing {
        document.finish_parsing_children(task.child);
    }
    true
}

/// Run every task queued so far, in order. Tasks queued while these run wait
/// for the next call.
pub fn execute_queued_tasks<Host: ScriptHost>(
    document: &mut Document,
    queue: &mut AttachmentQueue,
    host: &mut Host,
) -> usize {
    let tasks = queue.take();
    let mut inserted = 0;
    for task in tasks {
        if execute_task(document, queue, host, task) {
            inserted += 1;
        }
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::QualName;

    fn element(doc: &mut Document, local: &str) -> NodeId {
        doc.create_element(QualName::html(local.into()), vec![])
    }

    #[test]
    fn pending_parent_reports_the_latest_queued_target() {
        let mut doc = Document::new();
        let div = element(&mut doc, "div");
        let span = element(&mut doc, "span");
        let b = element(&mut doc, "b");
        let mut queue = AttachmentQueue::new();
        queue.push(AttachmentTask::append(div, b));
        queue.push(AttachmentTask::append(b, span));
        assert_eq!(queue.pending_parent(b), Some(div));
        assert_eq!(queue.pending_parent(span), Some(b));
        assert_eq!(queue.pending_parent(div), None);

        queue.take();
        assert_eq!(queue.pending_parent(b), None);
    }

    #[test]
    fn runs_in_order() {
        let mut doc = Document::new();
        let root = doc.document_node();
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "i");

        let mut queue = AttachmentQueue::new();
        queue.push(AttachmentTask::append(root, a));
        queue.push(AttachmentTask::append(a, c));
        queue.push(AttachmentTask::insert_before(a, b, c));
        assert_eq!(execute_queued_tasks(&mut doc, &mut queue, &mut NoScripting), 3);
        assert!(queue.is_empty());
        assert_eq!(doc.children(a), &[b, c]);
        assert!(doc.element(c).unwrap().flags.attached);
    }

    #[test]
    fn skips_tasks_invalidated_by_script() {
        let mut doc = Document::new();
        let root = doc.document_node();
        let x = element(&mut doc, "a");
        let y = element(&mut doc, "b");

        let mut queue = AttachmentQueue::new();
        queue.push(AttachmentTask::append(root, x));
        queue.push(AttachmentTask::append(root, y));

        struct DestroyOnInsert {
            trigger: NodeId,
            victim: NodeId,
        }
        impl ScriptHost for DestroyOnInsert {
            fn node_inserted(&mut self, cx: &mut ScriptContext, node: NodeId) {
                if node == self.trigger {
                    cx.document_mut().destroy(self.victim);
                }
            }
        }

        let mut host = DestroyOnInsert {
            trigger: x,
            victim: y,
        };
        assert_eq!(execute_queued_tasks(&mut doc, &mut queue, &mut host), 1);
        assert_eq!(doc.children(root), &[x]);
    }

    #[test]
    fn work_queued_by_script_waits_for_next_flush() {
        let mut doc = Document::new();
        let root = doc.document_node();
        let x = element(&mut doc, "a");
        let late = element(&mut doc, "b");

        let mut queue = AttachmentQueue::new();
        queue.push(AttachmentTask::append(root, x));
        struct QueueOnInsert {
            trigger: NodeId,
            late: NodeId,
        }
        impl ScriptHost for QueueOnInsert {
            fn node_inserted(&mut self, cx: &mut ScriptContext, node: NodeId) {
                if node == self.trigger {
                    cx.queue_attachment(AttachmentTask::append(self.trigger, self.late));
                }
            }
        }

        let mut host = QueueOnInsert { trigger: x, late };
        assert_eq!(execute_queued_tasks(&mut doc, &mut queue, &mut host), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(execute_queued_tasks(&mut doc, &mut queue, &mut host), 1);
        assert_eq!(doc.children(x), &[late]);
    }

    #[test]
    fn self_closing_child_is_finished() {
        let mut doc = Document::new();
        let br = element(&mut doc, "br");
        let parent = element(&mut doc, "p");
        let mut queue = AttachmentQueue::new();
        queue.push(AttachmentTask {
            self_closing: true,
            ..AttachmentTask::append(parent, br)
        });
        execute_queued_tasks(&mut doc, &mut queue, &mut NoScripting);
        let flags = doc.element(br).unwrap().flags;
        assert!(flags.finished_parsing_children);
        // The parent is not connected to the document.
        assert!(!flags.attached);
    }
}

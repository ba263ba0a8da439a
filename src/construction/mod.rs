// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The construction site: turns classified tokens into DOM mutations.
//!
//! An external tree-builder state machine decides, per token and insertion
//! mode, which operation to call. The site creates the node, decides where
//! it goes, and keeps the stack of open elements and the list of active
//! formatting elements up to date. Element and comment insertions are
//! queued; the driver calls [`ConstructionSite::execute_queued_tasks`] after
//! each token. Text is inserted immediately.

#[macro_use]
mod tag_sets;

pub mod data;
pub mod formatting;
pub mod policy;
pub mod queue;
pub mod stack;

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

pub use self::formatting::{ActiveFormattingElements, Bookmark, FormatEntry};
pub use self::policy::ParserContentPolicy;
pub use self::queue::{AttachmentQueue, AttachmentTask, NoScripting, ScriptContext, ScriptHost};
pub use self::stack::{ItemKind, OpenElements, StackItem};

use self::tag_sets::*;
use crate::dom::{Document, NodeData, NodeId};
use crate::interface::{Attribute, QualName, Quirks, QuirksMode};
use crate::tendril::StrTendril;
use crate::tokens::{Doctype, Tag};
use crate::{LocalName, Namespace};

/// Whether a character run is known to be all whitespace.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum WhitespaceMode {
    AllWhitespace,
    NotAllWhitespace,
    WhitespaceUnknown,
}

/// Construction site options, with an impl for Default.
#[derive(Clone, Debug)]
pub struct ConstructionSiteOpts {
    /// Report all parse errors described in the HTML standard, at some
    /// performance penalty? Default: false
    pub exact_errors: bool,

    /// What to do with scripts and scripting attributes.
    pub content_policy: ParserContentPolicy,

    /// Past this many open elements, new nodes are attached to the current
    /// node's parent instead of the current node. Default: 512
    pub maximum_dom_tree_depth: usize,

    /// Longest text node the parser creates, in bytes, outside `<script>` and
    /// `<style>`. Default: 65536
    pub text_length_limit: usize,

    /// Is this an `iframe srcdoc` document?
    pub iframe_srcdoc: bool,

    /// Initial document quirks mode. For fragments, the context document's mode.
    pub quirks_mode: QuirksMode,
}

impl Default for ConstructionSiteOpts {
    fn default() -> ConstructionSiteOpts {
        ConstructionSiteOpts {
            exact_errors: false,
            content_policy: ParserContentPolicy::AllowScriptingContent,
            maximum_dom_tree_depth: 512,
            text_length_limit: 65536,
            iframe_srcdoc: false,
            quirks_mode: QuirksMode::NoQuirks,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum State {
    Active,
    Aborted(&'static str),
    Detached,
}

/// Longest whitespace run worth sharing.
const MAXIMUM_CACHED_WHITESPACE: usize = 128;

/// Distinct whitespace runs kept for sharing.
const MAXIMUM_CACHED_WHITESPACE_RUNS: usize = 64;

/// Shares one buffer between identical all-whitespace text nodes.
#[derive(Default)]
struct WhitespaceCache {
    strings: HashMap<String, StrTendril>,
}

impl WhitespaceCache {
    fn get(&mut self, s: &str) -> StrTendril {
        if s.len() > MAXIMUM_CACHED_WHITESPACE {
            return StrTendril::from_slice(s);
        }
        if let Some(shared) = self.strings.get(s) {
            return shared.clone();
        }
        let shared = StrTendril::from_slice(s);
        if self.strings.len() < MAXIMUM_CACHED_WHITESPACE_RUNS {
            self.strings.insert(s.to_owned(), shared.clone());
        }
        shared
    }

    fn clear(&mut self) {
        self.strings.clear();
    }
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r')
}

/// The end of a chunk of at most `limit` bytes starting at `start`, on a char
/// boundary. A chunk never comes back empty: an unsplittable run is
/// returned whole.
fn chunk_end(s: &str, start: usize, limit: usize) -> usize {
    let mut end = start.saturating_add(limit).min(s.len());
    while end > start && !s.is_char_boundary(end) {
        end -= 1;
    }
    if end == start {
        s.len()
    } else {
        end
    }
}

pub struct ConstructionSite<Host = NoScripting> {
    opts: ConstructionSiteOpts,
    state: State,
    document: Document,
    attachment_root: NodeId,
    is_parsing_fragment: bool,

    open_elements: OpenElements,
    active_formatting_elements: ActiveFormattingElements,
    queue: AttachmentQueue,
    host: Host,

    /// The `<head>` element, kept after it is popped.
    head: Option<Rc<StackItem>>,
    /// The form element pointer.
    form: Option<NodeId>,
    redirect_attach_to_foster_parent: bool,
    quirks_mode: QuirksMode,
    /// Set once a DOCTYPE (or its absence) has settled the mode.
    compatibility_mode_determined: bool,
    whitespace_cache: WhitespaceCache,
}

impl ConstructionSite<NoScripting> {
    /// A site building a new document.
    pub fn new(opts: ConstructionSiteOpts) -> ConstructionSite<NoScripting> {
        ConstructionSite::with_host(opts, NoScripting)
    }

    /// A site building a document fragment.
    pub fn new_fragment(opts: ConstructionSiteOpts) -> ConstructionSite<NoScripting> {
        ConstructionSite::fragment_with_host(opts, NoScripting)
    }
}

impl<Host: ScriptHost> ConstructionSite<Host> {
    pub fn with_host(opts: ConstructionSiteOpts, host: Host) -> ConstructionSite<Host> {
        let document = Document::new();
        let root = document.document_node();
        ConstructionSite::build(opts, host, document, root, false)
    }

    /// A fragment parse: nodes are attached under a `DocumentFragment`,
    /// which also becomes the bottom of the stack of open elements.
    pub fn fragment_with_host(opts: ConstructionSiteOpts, host: Host) -> ConstructionSite<Host> {
        let mut document = Document::new();
        let fragment = document.create_fragment();
        let mut site = ConstructionSite::build(opts, host, document, fragment, true);
        site.open_elements
            .push_root_node(StackItem::for_fragment(fragment));
        site
    }

    fn build(
        opts: ConstructionSiteOpts,
        host: Host,
        mut document: Document,
        attachment_root: NodeId,
        is_parsing_fragment: bool,
    ) -> ConstructionSite<Host> {
        document.set_quirks_mode(opts.quirks_mode);
        ConstructionSite {
            quirks_mode: opts.quirks_mode,
            opts,
            state: State::Active,
            document,
            attachment_root,
            is_parsing_fragment,
            open_elements: OpenElements::new(),
            active_formatting_elements: ActiveFormattingElements::new(),
            queue: AttachmentQueue::new(),
            host,
            head: None,
            form: None,
            redirect_attach_to_foster_parent: false,
            compatibility_mode_determined: false,
            whitespace_cache: WhitespaceCache::default(),
        }
    }

    // State

    fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Give up on this parse after a broken invariant. Logged once; every
    /// later operation is a no-op.
    fn abort(&mut self, reason: &'static str) {
        if self.state != State::Active {
            return;
        }
        error!("construction site aborted: {}", reason);
        self.state = State::Aborted(reason);
    }

    pub fn abort_reason(&self) -> Option<&'static str> {
        match self.state {
            State::Aborted(reason) => Some(reason),
            _ => None,
        }
    }

    /// Drop the document. Every later operation is a no-op.
    pub fn detach(&mut self) {
        if self.state == State::Detached {
            return;
        }
        debug!("detaching construction site");
        self.state = State::Detached;
        self.document = Document::new();
        self.attachment_root = self.document.document_node();
        self.open_elements = OpenElements::new();
        self.active_formatting_elements = ActiveFormattingElements::new();
        self.queue = AttachmentQueue::new();
        self.head = None;
        self.form = None;
        self.whitespace_cache.clear();
    }

    pub fn is_detached(&self) -> bool {
        self.state == State::Detached
    }

    /// Flush pending work and hand over the document, unless detached.
    pub fn finish(mut self) -> Option<Document> {
        self.execute_queued_tasks();
        match self.state {
            State::Detached => None,
            _ => Some(self.document),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self.state {
            State::Detached => None,
            _ => Some(&self.document),
        }
    }

    pub fn document_mut(&mut self) -> Option<&mut Document> {
        match self.state {
            State::Detached => None,
            _ => Some(&mut self.document),
        }
    }

    pub fn is_parsing_fragment(&self) -> bool {
        self.is_parsing_fragment
    }

    /// The document node, or the fragment for a fragment parse.
    pub fn attachment_root(&self) -> NodeId {
        self.attachment_root
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// Record a parse error on the document.
    pub fn parse_error(&mut self, msg: Cow<'static, str>) {
        if !self.is_active() {
            return;
        }
        debug!("parse error: {}", msg);
        self.document.parse_error(msg);
    }

    // Stack of open elements

    pub fn open_elements(&self) -> &OpenElements {
        &self.open_elements
    }

    pub fn open_elements_mut(&mut self) -> &mut OpenElements {
        &mut self.open_elements
    }

    pub fn active_formatting_elements(&self) -> &ActiveFormattingElements {
        &self.active_formatting_elements
    }

    pub fn active_formatting_elements_mut(&mut self) -> &mut ActiveFormattingElements {
        &mut self.active_formatting_elements
    }

    pub fn is_empty(&self) -> bool {
        self.open_elements.is_empty()
    }

    pub fn current_stack_item(&self) -> Option<&Rc<StackItem>> {
        self.open_elements.top()
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.open_elements.top_node()
    }

    pub fn one_below_top(&self) -> Option<&Rc<StackItem>> {
        self.open_elements.one_below_top()
    }

    pub fn current_is_root_node(&self) -> bool {
        self.open_elements.top_node().is_some()
            && self.open_elements.top_node() == self.open_elements.root_node()
    }

    pub fn head_stack_item(&self) -> Option<&Rc<StackItem>> {
        self.head.as_ref()
    }

    fn finish_popped(&mut self, items: &[Rc<StackItem>]) {
        for item in items {
            self.document.finish_parsing_children(item.node());
        }
    }

    /// Pop the current node, marking it finished.
    pub fn pop(&mut self) -> Option<Rc<StackItem>> {
        if !self.is_active() {
            return None;
        }
        match self.open_elements.pop() {
            Some(item) => {
                self.document.finish_parsing_children(item.node());
                Some(item)
            },
            None => {
                self.abort("popped an empty stack of open elements");
                None
            },
        }
    }

    /// Pop up to and including the topmost HTML element named `local`.
    pub fn pop_until_popped(&mut self, local: &LocalName) -> Vec<Rc<StackItem>> {
        if !self.is_active() {
            return vec![];
        }
        if self.open_elements.topmost(local).is_none() {
            let msg = format_if!(
                self.opts.exact_errors,
                "No open element to close",
                "No <{}> element to close",
                local
            );
            self.parse_error(msg);
            return vec![];
        }
        let popped = self.open_elements.pop_until_popped(local);
        self.finish_popped(&popped);
        popped
    }

    pub fn pop_all(&mut self) -> Vec<Rc<StackItem>> {
        if !self.is_active() {
            return vec![];
        }
        let popped = self.open_elements.pop_all();
        self.finish_popped(&popped);
        popped
    }

    fn pop_while<F>(&mut self, pred: F)
    where
        F: Fn(&StackItem) -> bool,
    {
        while self.current_stack_item().map_or(false, |item| pred(&**item)) {
            self.pop();
        }
    }

    /// Pop while the current node is one of `dd dt li option optgroup p rp rt`.
    pub fn generate_implied_end_tags(&mut self) {
        if !self.is_active() {
            return;
        }
        self.pop_while(|item| item.is_element() && cursory_implied_end(item.expanded()));
    }

    /// As [`generate_implied_end_tags`], but never pops an HTML element
    /// named `except`.
    ///
    /// [`generate_implied_end_tags`]: ConstructionSite::generate_implied_end_tags
    pub fn generate_implied_end_tags_with_exclusion(&mut self, except: &LocalName) {
        if !self.is_active() {
            return;
        }
        self.pop_while(|item| {
            item.is_element() && cursory_implied_end(item.expanded()) && !item.is_html(except)
        });
    }

    // Form pointer

    pub fn form(&self) -> Option<NodeId> {
        self.form
    }

    pub fn set_form(&mut self, form: Option<NodeId>) {
        self.form = form;
    }

    pub fn take_form(&mut self) -> Option<NodeId> {
        self.form.take()
    }

    // Foster parenting

    pub fn set_redirect_attach_to_foster_parent(&mut self, redirect: bool) {
        self.redirect_attach_to_foster_parent = redirect;
    }

    pub fn redirect_attach_to_foster_parent(&self) -> bool {
        self.redirect_attach_to_foster_parent
    }

    /// Run `f` with foster-parent redirection on, then restore the old setting.
    pub fn with_redirect_to_foster_parent<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let saved = self.redirect_attach_to_foster_parent;
        self.redirect_attach_to_foster_parent = true;
        let result = f(self);
        self.redirect_attach_to_foster_parent = saved;
        result
    }

    fn should_foster_parent(&self) -> bool {
        self.redirect_attach_to_foster_parent
            && self
                .current_stack_item()
                .map_or(false, |item| item.causes_foster_parenting())
    }

    /// Where content goes when `node` is its nominal parent.
    fn insertion_parent(&self, node: NodeId) -> NodeId {
        self.document.template_contents(node).unwrap_or(node)
    }

    /// https://html.spec.whatwg.org/multipage/#foster-parent
    ///
    /// Returns the parent and the node to insert before.
    fn find_foster_site(&self) -> (NodeId, Option<NodeId>) {
        let template = self.open_elements.topmost(&local_name!("template"));
        let table = self.open_elements.topmost(&local_name!("table"));

        if let Some((template_index, template)) = template {
            if table.map_or(true, |(table_index, _)| template_index > table_index) {
                return (self.insertion_parent(template.node()), None);
            }
        }

        if let Some((table_index, table)) = table {
            let table = table.node();
            let parent = self.document.parent(table);
            if let Some(parent) = parent {
                if matches!(
                    self.document.data(parent),
                    NodeData::Element(_) | NodeData::DocumentFragment
                ) {
                    return (parent, Some(table));
                }
            }
            let below = table_index
                .checked_sub(1)
                .and_then(|i| self.open_elements.iter().nth(i));
            if let Some(below) = below {
                return (self.insertion_parent(below.node()), None);
            }
        }

        let root = self.open_elements.root_node().unwrap_or(self.attachment_root);
        (root, None)
    }

    /// Queue `node` for attachment at the foster parenting site.
    pub fn foster_parent(&mut self, node: NodeId) {
        if !self.is_active() {
            return;
        }
        self.queue_at_foster_site(node, false);
    }

    fn queue_at_foster_site(&mut self, child: NodeId, self_closing: bool) {
        let (parent, next_child) = self.find_foster_site();
        debug!("foster parenting {:?} into {:?}", child, parent);
        self.queue.push(AttachmentTask {
            parent,
            child,
            next_child,
            self_closing,
        });
    }

    // Attachment

    fn attach_later(&mut self, parent: NodeId, child: NodeId, self_closing: bool) {
        if self.should_foster_parent() {
            return self.queue_at_foster_site(child, self_closing);
        }

        let mut parent = self.insertion_parent(parent);

        // Past the depth limit, attach as a sibling of the parent instead. The
        // parent may itself still be waiting in the queue.
        if self.open_elements.stack_depth() > self.opts.maximum_dom_tree_depth {
            let grandparent = self
                .document
                .parent(parent)
                .or_else(|| self.queue.pending_parent(parent));
            if let Some(grandparent) = grandparent {
                warn!(
                    "open element depth {} exceeds {}; attaching {:?} to {:?}",
                    self.open_elements.stack_depth(),
                    self.opts.maximum_dom_tree_depth,
                    child,
                    grandparent
                );
                parent = grandparent;
            }
        }

        self.queue.push(AttachmentTask {
            parent,
            child,
            next_child: None,
            self_closing,
        });
    }

    fn attach_to_current(&mut self, child: NodeId, self_closing: bool) -> bool {
        match self.current_node() {
            Some(parent) => {
                self.attach_later(parent, child, self_closing);
                true
            },
            None => {
                self.abort("insertion with no current node");
                false
            },
        }
    }

    /// Run the queued attachment tasks. Returns how many nodes were inserted.
    pub fn execute_queued_tasks(&mut self) -> usize {
        if !self.is_active() || self.queue.is_empty() {
            return 0;
        }
        queue::execute_queued_tasks(&mut self.document, &mut self.queue, &mut self.host)
    }

    /// End of input: close everything and flush.
    pub fn finished_parsing(&mut self) {
        if !self.is_active() {
            return;
        }
        debug!("finished parsing");
        self.pop_all();
        self.execute_queued_tasks();
        self.whitespace_cache.clear();
        self.document.finish_parsing();
    }

    // Element creation

    fn create_element(&mut self, name: QualName, mut attrs: Vec<Attribute>) -> Rc<StackItem> {
        policy::filter_attributes(self.opts.content_policy, &mut attrs);
        let node = self.document.create_element(name.clone(), attrs.clone());

        if name.ns == ns!(html) && form_associatable(name.expanded()) {
            if let Some(form) = self.form {
                if self.document.is_alive(form) && !self.open_elements.has_template_in_html_scope()
                {
                    if let Some(elem) = self.document.element_mut(node) {
                        elem.form_owner = Some(form);
                    }
                }
            }
        }

        StackItem::for_element(node, name, attrs)
    }

    fn create_html_element(&mut self, tag: &Tag) -> Rc<StackItem> {
        self.create_element(QualName::html(tag.name.clone()), tag.attrs.clone())
    }

    /// A new, detached element with the name and attributes `item` was
    /// created with.
    pub fn create_element_from_saved_token(&mut self, item: &StackItem) -> Option<Rc<StackItem>> {
        if !self.is_active() {
            return None;
        }
        Some(self.create_element(item.name().clone(), item.attrs().to_vec()))
    }

    fn merge_attributes(&mut self, tag: Tag, target: NodeId) {
        if tag.attrs.is_empty() {
            return;
        }
        let mut attrs = tag.attrs;
        policy::filter_attributes(self.opts.content_policy, &mut attrs);
        self.document.add_attrs_if_missing(target, attrs);
    }

    // Insertion operations

    /// The root `<html>` element, for the first `<html>` start tag.
    pub fn insert_html_html_start_tag_before_html(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        debug!("insert root <html>");
        let item = self.create_html_element(&tag);
        self.attach_later(self.attachment_root, item.node(), false);
        self.open_elements.push_html_html_element(item);
        self.execute_queued_tasks();
    }

    /// A later `<html>` start tag adds its missing attributes to the root.
    pub fn insert_html_html_start_tag_in_body(&mut self, tag: Tag) {
        if !self.is_active() || self.is_parsing_fragment {
            return;
        }
        match self.open_elements.html_element() {
            Some(html) => self.merge_attributes(tag, html),
            None => self.abort("no <html> element to merge attributes into"),
        }
    }

    /// A later `<body>` start tag adds its missing attributes to the body.
    pub fn insert_html_body_start_tag_in_body(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        match self.open_elements.body_element() {
            Some(body) => self.merge_attributes(tag, body),
            None => self.abort("no <body> element to merge attributes into"),
        }
    }

    pub fn insert_html_head_element(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        let item = self.create_html_element(&tag);
        if self.attach_to_current(item.node(), false) {
            self.head = Some(item.clone());
            self.open_elements.push_html_head_element(item);
        }
    }

    pub fn insert_html_body_element(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        let item = self.create_html_element(&tag);
        if self.attach_to_current(item.node(), false) {
            self.open_elements.push_html_body_element(item);
        }
    }

    /// Insert a `<form>` and make it the form element pointer. `is_demoted`
    /// marks a form nested where forms cannot be.
    pub fn insert_html_form_element(&mut self, tag: Tag, is_demoted: bool) {
        if !self.is_active() {
            return;
        }
        let item = self.create_html_element(&tag);
        if !self.open_elements.has_template_in_html_scope() {
            self.form = Some(item.node());
        }
        if let Some(elem) = self.document.element_mut(item.node()) {
            elem.flags.form_demoted = is_demoted;
        }
        if self.attach_to_current(item.node(), false) {
            self.open_elements.push(item);
        }
    }

    pub fn insert_html_element(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        debug!("insert <{}>", tag.name);
        let item = self.create_html_element(&tag);
        if self.attach_to_current(item.node(), false) {
            self.open_elements.push(item);
        }
    }

    /// An element that is never pushed, like `<br>` or `<img>`. It is
    /// finished as soon as it is attached.
    pub fn insert_self_closing_html_element(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        debug!("insert self-closing <{}>", tag.name);
        let item = self.create_html_element(&tag);
        self.attach_to_current(item.node(), true);
    }

    /// Insert an element and add it to the active formatting elements.
    pub fn insert_formatting_element(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        self.insert_html_element(tag);
        if let Some(item) = self.current_stack_item().cloned() {
            self.active_formatting_elements.append(item);
        }
    }

    pub fn insert_script_element(&mut self, tag: Tag) {
        if !self.is_active() {
            return;
        }
        let policy = self.opts.content_policy;
        let parser_inserted =
            policy != ParserContentPolicy::AllowScriptingContentAndDoNotMarkAlreadyStarted;
        let already_started = self.is_parsing_fragment && parser_inserted;

        let item = self.create_html_element(&tag);
        if let Some(elem) = self.document.element_mut(item.node()) {
            elem.flags.parser_inserted = parser_inserted;
            elem.flags.already_started = already_started;
        }
        if policy.scripting_content_is_allowed() && !self.attach_to_current(item.node(), false) {
            return;
        }
        if self.current_node().is_none() {
            return self.abort("insertion with no current node");
        }
        self.open_elements.push(item);
    }

    /// An element in `ns`. Self-closing foreign elements are not pushed.
    pub fn insert_foreign_element(&mut self, tag: Tag, ns: Namespace) {
        if !self.is_active() {
            return;
        }
        debug!("insert foreign <{}> in {}", tag.name, ns);
        let self_closing = tag.self_closing;
        let item = self.create_element(QualName::new(None, ns, tag.name), tag.attrs);

        let is_script = matches!(item.expanded(), expanded_name!(svg "script"));
        if is_script {
            if let Some(elem) = self.document.element_mut(item.node()) {
                elem.flags.parser_inserted = true;
            }
        }

        if self.opts.content_policy.scripting_content_is_allowed() || !is_script {
            if !self.attach_to_current(item.node(), self_closing) {
                return;
            }
        } else if self.current_node().is_none() {
            return self.abort("insertion with no current node");
        }
        if !self_closing {
            self.open_elements.push(item);
        }
    }

    pub fn insert_comment(&mut self, text: StrTendril) {
        if !self.is_active() {
            return;
        }
        let comment = self.document.create_comment(text);
        self.attach_to_current(comment, false);
    }

    /// A comment before or after the root element.
    pub fn insert_comment_on_document(&mut self, text: StrTendril) {
        if !self.is_active() {
            return;
        }
        let comment = self.document.create_comment(text);
        self.attach_later(self.attachment_root, comment, false);
    }

    /// A comment after `</body>`, as the last child of the root element.
    pub fn insert_comment_on_html_html_element(&mut self, text: StrTendril) {
        if !self.is_active() {
            return;
        }
        let root = match self.open_elements.root_node() {
            Some(root) => root,
            None => return self.abort("no root element for comment"),
        };
        let comment = self.document.create_comment(text);
        self.attach_later(root, comment, false);
    }

    /// Insert a run of character data.
    ///
    /// Extends the preceding text node when there is one. Otherwise, and
    /// for whatever does not fit, creates text nodes of at most
    /// `text_length_limit` bytes (no limit inside `<script>` and `<style>`).
    /// Unlike elements, text is inserted immediately, after any attachments
    /// still queued.
    pub fn insert_text_node(&mut self, characters: &str, whitespace_mode: WhitespaceMode) {
        if !self.is_active() || characters.is_empty() {
            return;
        }
        self.execute_queued_tasks();
        let current = match self.current_node() {
            Some(current) => current,
            None => return self.abort("text inserted with no current node"),
        };

        let (parent, next_child) = if self.should_foster_parent() {
            self.find_foster_site()
        } else {
            (self.insertion_parent(current), None)
        };

        let limit = match self.document.elem_name(parent) {
            Some(name) if unlimited_text(name) => usize::MAX,
            _ => self.opts.text_length_limit,
        };

        let use_cache = match whitespace_mode {
            WhitespaceMode::AllWhitespace => true,
            WhitespaceMode::NotAllWhitespace => false,
            WhitespaceMode::WhitespaceUnknown => characters.chars().all(is_html_whitespace),
        };

        let previous = match next_child {
            Some(next) => self.document.previous_sibling(next),
            None => self.document.last_child(parent),
        };

        let mut position = 0;
        if let Some(previous) = previous {
            if let Some(existing) = self.document.text(previous).map(|t| t.len()) {
                let available = limit.saturating_sub(existing).min(characters.len());
                let mut end = available;
                while end > 0 && !characters.is_char_boundary(end) {
                    end -= 1;
                }
                if end > 0 {
                    self.document.append_text(previous, &characters[..end]);
                    position = end;
                }
            }
        }

        while position < characters.len() {
            let end = chunk_end(characters, position, limit);
            let chunk = &characters[position..end];
            let contents = if use_cache {
                self.whitespace_cache.get(chunk)
            } else {
                StrTendril::from_slice(chunk)
            };
            position = end;

            let text = self.document.create_text(contents);
            let task = AttachmentTask {
                parent,
                child: text,
                next_child,
                self_closing: false,
            };
            queue::execute_task(&mut self.document, &mut self.queue, &mut self.host, task);
        }
    }

    /// Attach a doctype node to the document and, for document parses,
    /// settle the compatibility mode from it.
    pub fn insert_doctype(&mut self, doctype: Doctype) {
        if !self.is_active() {
            return;
        }
        if !data::is_conforming_doctype(&doctype) {
            let msg = format_if!(
                self.opts.exact_errors,
                "Bad DOCTYPE",
                "Bad DOCTYPE: {:?}",
                doctype
            );
            self.parse_error(msg);
        }
        if self.compatibility_mode_determined {
            self.parse_error(Cow::Borrowed("DOCTYPE after the compatibility mode was set"));
        }

        let mode = if doctype.force_quirks {
            Quirks
        } else if self.opts.iframe_srcdoc {
            QuirksMode::NoQuirks
        } else {
            data::classify_doctype(&doctype)
        };

        let Doctype {
            name,
            public_id,
            system_id,
            force_quirks: _,
        } = doctype;
        let node = self.document.create_doctype(
            name.unwrap_or_default(),
            public_id.unwrap_or_default(),
            system_id.unwrap_or_default(),
        );
        self.attach_later(self.attachment_root, node, false);

        if self.is_parsing_fragment {
            return;
        }
        self.set_compatibility_mode(mode);
    }

    // Compatibility mode

    /// Settle the compatibility mode. This happens at most once per
    /// document: later calls, including later DOCTYPEs, change nothing.
    pub fn set_compatibility_mode(&mut self, mode: QuirksMode) {
        if !self.is_active() {
            return;
        }
        if self.compatibility_mode_determined {
            debug!("compatibility mode stays {:?}, ignoring {:?}", self.quirks_mode, mode);
            return;
        }
        debug!("compatibility mode {:?}", mode);
        self.quirks_mode = mode;
        self.compatibility_mode_determined = true;
        if !self.document.set_quirks_mode(mode) {
            debug!("document compatibility mode is locked");
        }
        self.document.lock_quirks_mode();
    }

    /// No DOCTYPE: quirks mode, except for fragments and `srcdoc` documents.
    pub fn set_default_compatibility_mode(&mut self) {
        if self.is_parsing_fragment || self.opts.iframe_srcdoc {
            return;
        }
        self.set_compatibility_mode(Quirks);
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    pub fn in_quirks_mode(&self) -> bool {
        self.quirks_mode == Quirks
    }

    // Active formatting elements

    /// https://html.spec.whatwg.org/multipage/#reconstruct-the-active-formatting-elements
    ///
    /// Reopens, in list order, every entry after the last marker or open
    /// element, as a fresh element created from the entry's original tag.
    /// The clones are attached like any other element, so the depth limit
    /// applies to them too.
    pub fn reconstruct_the_active_formatting_elements(&mut self) {
        if !self.is_active() {
            return;
        }
        let first = match self
            .active_formatting_elements
            .first_unopen_index(&self.open_elements)
        {
            Some(first) => first,
            None => return,
        };

        for index in first..self.active_formatting_elements.len() {
            let entry = self
                .active_formatting_elements
                .at(index)
                .and_then(FormatEntry::item)
                .cloned();
            let entry = match entry {
                Some(entry) => entry,
                None => return self.abort("marker after the first unopened formatting element"),
            };
            debug!("reconstructing {:?}", entry);

            let reconstructed = match self.create_element_from_saved_token(&entry) {
                Some(reconstructed) => reconstructed,
                None => return,
            };
            if !self.attach_to_current(reconstructed.node(), false) {
                return;
            }
            self.open_elements.push(reconstructed.clone());
            self.active_formatting_elements.replace_at(index, reconstructed);
        }
    }
}

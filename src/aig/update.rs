//! Update sessions record what a batch of edits touched, for passes that need to know exactly what
//! changed in the AIG.

use std::collections::HashSet;

use super::{Aig, NodeId};

/// What changed since the session was started (or last reset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSession {
    added_nodes: Vec<NodeId>,
    updated_nets: Vec<NodeId>,
    seen_nets: HashSet<NodeId>,
}

impl UpdateSession {
    /// AND gates created by a structural hashing miss, in creation order.
    pub fn added_nodes(&self) -> &[NodeId] {
        &self.added_nodes
    }

    /// Nodes whose fanout set changed, each listed once.
    ///
    /// Some of them may have been deleted afterwards, check with [`Aig::get_node`].
    pub fn updated_nets(&self) -> &[NodeId] {
        &self.updated_nets
    }

    fn record_net(&mut self, id: NodeId) {
        if self.seen_nets.insert(id) {
            self.updated_nets.push(id);
        }
    }
}

impl Aig {
    /// Starts recording added nodes and updated nets.
    ///
    /// Panics if a session is already running.
    pub fn begin_update(&mut self) {
        assert!(self.update.is_none(), "an update session is already running");
        self.update = Some(UpdateSession::default());
    }

    /// Ends the running session and returns its record.
    ///
    /// Panics if no session is running.
    pub fn end_update(&mut self) -> UpdateSession {
        match self.update.take() {
            Some(session) => session,
            None => panic!("no update session is running"),
        }
    }

    /// Forgets everything recorded so far, the session keeps running.
    ///
    /// Panics if no session is running.
    pub fn reset_update(&mut self) {
        match self.update.as_mut() {
            Some(session) => *session = UpdateSession::default(),
            None => panic!("no update session is running"),
        }
    }

    /// The running session, if any.
    pub fn update_session(&self) -> Option<&UpdateSession> {
        self.update.as_ref()
    }

    pub(crate) fn record_added(&mut self, id: NodeId) {
        if let Some(session) = self.update.as_mut() {
            session.added_nodes.push(id);
        }
    }

    pub(crate) fn record_net(&mut self, id: NodeId) {
        if let Some(session) = self.update.as_mut() {
            session.record_net(id);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn session_records_new_nodes_only() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let ab = aig.make_and(a, b);
        aig.begin_update();
        // hit
        assert_eq!(aig.make_and(b, a), ab);
        assert_eq!(aig.make_and(a, !a), aig.const0());
        let m = aig.make_and(!a, b);
        let session = aig.update_session().unwrap();
        assert_eq!(session.added_nodes(), &[m.get_node_id()]);
        assert!(session.updated_nets().is_empty());

        aig.reset_update();
        assert!(aig.update_session().unwrap().added_nodes().is_empty());
        let record = aig.end_update();
        assert_eq!(record, UpdateSession::default());
        assert!(aig.update_session().is_none());
    }

    #[test]
    fn session_records_updated_nets() {
        let mut aig = Aig::new();
        let a = aig.add_input();
        let b = aig.add_input();
        let c = aig.add_input();
        let n = aig.make_and(a, b);
        let o = aig.add_output(n).unwrap();

        aig.begin_update();
        aig.replace(n.get_node_id(), !c, false);
        let session = aig.end_update();
        // the output now reads c, the fanins of n lost a fanout
        let nets = session.updated_nets();
        assert!(nets.contains(&c.get_node_id()));
        assert!(nets.contains(&a.get_node_id()));
        assert!(nets.contains(&b.get_node_id()));
        assert_eq!(nets.iter().filter(|&&id| id == a.get_node_id()).count(), 1);
        assert_eq!(aig.get_outputs(), vec![!c]);
        assert!(aig.get_node(o).is_some());
    }

    #[test]
    fn nets_keep_first_record_order() {
        let mut aig = Aig::new();
        aig.begin_update();
        for id in [3, 1, 3, 2, 1, 3] {
            aig.record_net(id);
        }
        assert_eq!(aig.update_session().unwrap().updated_nets(), &[3, 1, 2]);
        aig.reset_update();
        aig.record_net(3);
        assert_eq!(aig.end_update().updated_nets(), &[3]);
    }

    #[test]
    #[should_panic]
    fn nested_sessions_panic() {
        let mut aig = Aig::new();
        aig.begin_update();
        aig.begin_update();
    }

    #[test]
    #[should_panic]
    fn ending_without_session_panics() {
        let mut aig = Aig::new();
        aig.end_update();
    }
}

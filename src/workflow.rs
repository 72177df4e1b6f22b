use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle stage of a syllabus within the approval pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum WorkflowStatus {
    Created,
    Assigned,
    Submitted,
    Approved,
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Assign,
    Approve,
    Return,
    Submit,
}

/// Explicit role variants. An administrator is stored as a coordinator
/// row with no career; this type makes that distinction a closed set
/// instead of an inference scattered across call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleView {
    Admin,
    Coordinator { career: String },
    Professor,
}

#[derive(Debug, Error)]
#[error("{action:?} is not permitted from status {current:?} for this role")]
pub struct TransitionDenied {
    pub current: WorkflowStatus,
    pub action: WorkflowAction,
}

/// Compute the status a transition would produce, or deny it.
///
/// Administrators are denied every transition; they manage reference
/// data only. Callers must not mutate the syllabus on denial.
pub fn next_status(
    actor: &RoleView,
    current: WorkflowStatus,
    action: WorkflowAction,
) -> Result<WorkflowStatus, TransitionDenied> {
    use WorkflowAction::*;
    use WorkflowStatus::*;

    let next = match (actor, action, current) {
        (RoleView::Coordinator { .. }, Assign, Created) => Assigned,
        (RoleView::Coordinator { .. }, Approve, Submitted) => Approved,
        (RoleView::Coordinator { .. }, Return, Submitted) => Returned,
        (RoleView::Professor, Submit, Assigned | Returned) => Submitted,
        _ => return Err(TransitionDenied { current, action }),
    };
    Ok(next)
}

/// Map a requested target status onto the action that produces it.
/// `CREATED` is never a transition target.
pub fn action_for_target(target: WorkflowStatus) -> Option<WorkflowAction> {
    match target {
        WorkflowStatus::Assigned => Some(WorkflowAction::Assign),
        WorkflowStatus::Approved => Some(WorkflowAction::Approve),
        WorkflowStatus::Returned => Some(WorkflowAction::Return),
        WorkflowStatus::Submitted => Some(WorkflowAction::Submit),
        WorkflowStatus::Created => None,
    }
}

/// Whether the actor may see a syllabus at all.
///
/// Professors see only their own syllabi and never ones still in
/// CREATED. Administrators see none. Coordinators see everything.
pub fn can_view(
    actor: &RoleView,
    actor_username: &str,
    professor_email: Option<&str>,
    status: WorkflowStatus,
) -> bool {
    match actor {
        RoleView::Admin => false,
        RoleView::Coordinator { .. } => true,
        RoleView::Professor => {
            status != WorkflowStatus::Created
                && professor_email.is_some_and(|e| e.eq_ignore_ascii_case(actor_username))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> RoleView {
        RoleView::Coordinator {
            career: "Ingeniería de Software".to_string(),
        }
    }

    #[test]
    fn assign_moves_created_to_assigned() {
        let next = next_status(&coordinator(), WorkflowStatus::Created, WorkflowAction::Assign)
            .expect("assign from created should succeed");
        assert_eq!(next, WorkflowStatus::Assigned);
    }

    #[test]
    fn assign_rejected_from_every_other_status() {
        for status in [
            WorkflowStatus::Assigned,
            WorkflowStatus::Submitted,
            WorkflowStatus::Approved,
            WorkflowStatus::Returned,
        ] {
            assert!(next_status(&coordinator(), status, WorkflowAction::Assign).is_err());
        }
    }

    #[test]
    fn approve_and_return_only_from_submitted() {
        let approved = next_status(
            &coordinator(),
            WorkflowStatus::Submitted,
            WorkflowAction::Approve,
        )
        .expect("approve from submitted");
        assert_eq!(approved, WorkflowStatus::Approved);

        let returned = next_status(
            &coordinator(),
            WorkflowStatus::Submitted,
            WorkflowAction::Return,
        )
        .expect("return from submitted");
        assert_eq!(returned, WorkflowStatus::Returned);

        for status in [
            WorkflowStatus::Created,
            WorkflowStatus::Assigned,
            WorkflowStatus::Approved,
            WorkflowStatus::Returned,
        ] {
            assert!(next_status(&coordinator(), status, WorkflowAction::Approve).is_err());
            assert!(next_status(&coordinator(), status, WorkflowAction::Return).is_err());
        }
    }

    #[test]
    fn admin_rejected_for_every_transition() {
        for status in [
            WorkflowStatus::Created,
            WorkflowStatus::Assigned,
            WorkflowStatus::Submitted,
            WorkflowStatus::Approved,
            WorkflowStatus::Returned,
        ] {
            for action in [
                WorkflowAction::Assign,
                WorkflowAction::Approve,
                WorkflowAction::Return,
                WorkflowAction::Submit,
            ] {
                assert!(
                    next_status(&RoleView::Admin, status, action).is_err(),
                    "admin must not perform {:?} from {:?}",
                    action,
                    status
                );
            }
        }
    }

    #[test]
    fn professor_submits_from_assigned_and_returned() {
        for status in [WorkflowStatus::Assigned, WorkflowStatus::Returned] {
            let next = next_status(&RoleView::Professor, status, WorkflowAction::Submit)
                .expect("professor submit");
            assert_eq!(next, WorkflowStatus::Submitted);
        }
    }

    #[test]
    fn submit_requires_professor_role() {
        assert!(next_status(
            &coordinator(),
            WorkflowStatus::Assigned,
            WorkflowAction::Submit
        )
        .is_err());
        assert!(next_status(
            &RoleView::Admin,
            WorkflowStatus::Returned,
            WorkflowAction::Submit
        )
        .is_err());
    }

    #[test]
    fn professor_cannot_assign_or_review() {
        assert!(next_status(
            &RoleView::Professor,
            WorkflowStatus::Created,
            WorkflowAction::Assign
        )
        .is_err());
        assert!(next_status(
            &RoleView::Professor,
            WorkflowStatus::Submitted,
            WorkflowAction::Approve
        )
        .is_err());
    }

    #[test]
    fn created_is_not_a_transition_target() {
        assert!(action_for_target(WorkflowStatus::Created).is_none());
        assert_eq!(
            action_for_target(WorkflowStatus::Assigned),
            Some(WorkflowAction::Assign)
        );
    }

    #[test]
    fn professor_never_sees_created() {
        assert!(!can_view(
            &RoleView::Professor,
            "prof@ulasalle.edu.pe",
            Some("prof@ulasalle.edu.pe"),
            WorkflowStatus::Created
        ));
    }

    #[test]
    fn professor_sees_only_own_syllabi() {
        assert!(can_view(
            &RoleView::Professor,
            "prof@ulasalle.edu.pe",
            Some("PROF@ulasalle.edu.pe"),
            WorkflowStatus::Assigned
        ));
        assert!(!can_view(
            &RoleView::Professor,
            "prof@ulasalle.edu.pe",
            Some("other@ulasalle.edu.pe"),
            WorkflowStatus::Assigned
        ));
        assert!(!can_view(
            &RoleView::Professor,
            "prof@ulasalle.edu.pe",
            None,
            WorkflowStatus::Assigned
        ));
    }

    #[test]
    fn admin_sees_nothing_coordinator_sees_all() {
        for status in [
            WorkflowStatus::Created,
            WorkflowStatus::Assigned,
            WorkflowStatus::Submitted,
            WorkflowStatus::Approved,
            WorkflowStatus::Returned,
        ] {
            assert!(!can_view(&RoleView::Admin, "admin", Some("x"), status));
            assert!(can_view(&coordinator(), "coord", Some("x"), status));
        }
    }
}

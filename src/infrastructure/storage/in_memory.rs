use crate::core::errors::GearShareError;
use crate::core::models::{
    audit::GroupAudit,
    borrow_request::{BorrowRequest, RequestStatus},
    group::Group,
    loan::{Loan, LoanStatus},
    resource::Resource,
    user::User,
};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

pub struct InMemoryStorage {
    users: Mutex<HashMap<String, User>>,
    emails: Mutex<HashMap<String, String>>, // email -> user_id
    groups: Mutex<HashMap<String, Group>>,
    resources: Mutex<HashMap<String, Resource>>,
    shares: Mutex<HashSet<(String, String)>>, // (resource_id, group_id)
    requests: Mutex<HashMap<String, BorrowRequest>>,
    loans: Mutex<HashMap<String, Loan>>, // keyed by borrow_request_id
    group_audits: Mutex<HashMap<String, Vec<GroupAudit>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            users: Mutex::new(HashMap::new()),
            emails: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
            resources: Mutex::new(HashMap::new()),
            shares: Mutex::new(HashSet::new()),
            requests: Mutex::new(HashMap::new()),
            loans: Mutex::new(HashMap::new()),
            group_audits: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_user(&self, user: User) -> Result<(), GearShareError> {
        let mut emails = self.emails.lock().await;
        if emails.contains_key(&user.email) {
            return Err(GearShareError::EmailAlreadyRegistered(user.email));
        }
        emails.insert(user.email.clone(), user.id.clone());
        let mut users = self.users.lock().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, GearShareError> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, GearShareError> {
        // For production: database index on email
        let user_id = self.emails.lock().await.get(email).cloned();
        Ok(match user_id {
            Some(id) => self.users.lock().await.get(&id).cloned(),
            None => None,
        })
    }

    async fn save_group(&self, group: Group) -> Result<(), GearShareError> {
        self.groups.lock().await.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>, GearShareError> {
        Ok(self.groups.lock().await.get(id).cloned())
    }

    async fn delete_group(&self, id: &str) -> Result<(), GearShareError> {
        self.groups.lock().await.remove(id);
        self.group_audits.lock().await.remove(id);
        Ok(())
    }

    async fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<Group>, GearShareError> {
        Ok(self
            .groups
            .lock()
            .await
            .values()
            .filter(|g| g.members.iter().any(|m| m.user.id == user_id))
            .cloned()
            .collect())
    }

    async fn save_resource(&self, resource: Resource) -> Result<(), GearShareError> {
        self.resources.lock().await.insert(resource.id.clone(), resource);
        Ok(())
    }

    async fn get_resource(&self, id: &str) -> Result<Option<Resource>, GearShareError> {
        Ok(self.resources.lock().await.get(id).cloned())
    }

    async fn delete_resource(&self, id: &str) -> Result<(), GearShareError> {
        self.resources.lock().await.remove(id);
        Ok(())
    }

    async fn list_resources_by_owner(&self, owner_id: &str) -> Result<Vec<Resource>, GearShareError> {
        Ok(self
            .resources
            .lock()
            .await
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn add_share(&self, resource_id: &str, group_id: &str) -> Result<(), GearShareError> {
        self.shares
            .lock()
            .await
            .insert((resource_id.to_string(), group_id.to_string()));
        Ok(())
    }

    async fn remove_share(&self, resource_id: &str, group_id: &str) -> Result<(), GearShareError> {
        self.shares
            .lock()
            .await
            .remove(&(resource_id.to_string(), group_id.to_string()));
        Ok(())
    }

    async fn share_exists(&self, resource_id: &str, group_id: &str) -> Result<bool, GearShareError> {
        Ok(self
            .shares
            .lock()
            .await
            .contains(&(resource_id.to_string(), group_id.to_string())))
    }

    async fn list_group_ids_for_resource(&self, resource_id: &str) -> Result<Vec<String>, GearShareError> {
        Ok(self
            .shares
            .lock()
            .await
            .iter()
            .filter(|(r, _)| r == resource_id)
            .map(|(_, g)| g.clone())
            .collect())
    }

    async fn list_resource_ids_for_group(&self, group_id: &str) -> Result<Vec<String>, GearShareError> {
        Ok(self
            .shares
            .lock()
            .await
            .iter()
            .filter(|(_, g)| g == group_id)
            .map(|(r, _)| r.clone())
            .collect())
    }

    async fn remove_shares_for_resource(&self, resource_id: &str) -> Result<(), GearShareError> {
        self.shares.lock().await.retain(|(r, _)| r != resource_id);
        Ok(())
    }

    async fn remove_shares_for_group(&self, group_id: &str) -> Result<(), GearShareError> {
        self.shares.lock().await.retain(|(_, g)| g != group_id);
        Ok(())
    }

    async fn save_request(&self, request: BorrowRequest) -> Result<(), GearShareError> {
        self.requests.lock().await.insert(request.id.clone(), request);
        Ok(())
    }

    async fn get_request(&self, id: &str) -> Result<Option<BorrowRequest>, GearShareError> {
        Ok(self.requests.lock().await.get(id).cloned())
    }

    async fn delete_request(&self, id: &str) -> Result<(), GearShareError> {
        self.requests.lock().await.remove(id);
        Ok(())
    }

    async fn list_requests_by_borrower(&self, user_id: &str) -> Result<Vec<BorrowRequest>, GearShareError> {
        Ok(self
            .requests
            .lock()
            .await
            .values()
            .filter(|r| r.borrower_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_requests_by_owner(&self, user_id: &str) -> Result<Vec<BorrowRequest>, GearShareError> {
        Ok(self
            .requests
            .lock()
            .await
            .values()
            .filter(|r| r.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_requests_by_resource(&self, resource_id: &str) -> Result<Vec<BorrowRequest>, GearShareError> {
        Ok(self
            .requests
            .lock()
            .await
            .values()
            .filter(|r| r.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn list_requests_by_group(&self, group_id: &str) -> Result<Vec<BorrowRequest>, GearShareError> {
        Ok(self
            .requests
            .lock()
            .await
            .values()
            .filter(|r| r.group_id.as_deref() == Some(group_id))
            .cloned()
            .collect())
    }

    async fn transition_request(
        &self,
        id: &str,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<BorrowRequest, GearShareError> {
        // The check-and-set happens under one lock hold, which is what makes
        // two concurrent accepts resolve to exactly one winner.
        let mut requests = self.requests.lock().await;
        let request = requests
            .get_mut(id)
            .ok_or_else(|| GearShareError::RequestNotFound(id.to_string()))?;
        if request.status != expected {
            return Err(GearShareError::WrongRequestState(
                id.to_string(),
                request.status.to_string(),
                expected.to_string(),
            ));
        }
        request.status = next;
        request.updated_at = chrono::Utc::now();
        Ok(request.clone())
    }

    async fn save_loan(&self, loan: Loan) -> Result<(), GearShareError> {
        self.loans.lock().await.insert(loan.borrow_request_id.clone(), loan);
        Ok(())
    }

    async fn get_loan_by_request(&self, request_id: &str) -> Result<Option<Loan>, GearShareError> {
        Ok(self.loans.lock().await.get(request_id).cloned())
    }

    async fn active_loan_for_resource(&self, resource_id: &str) -> Result<Option<Loan>, GearShareError> {
        // Loans key off the request, so resolve the resource through it.
        let requests = self.requests.lock().await;
        let loans = self.loans.lock().await;
        Ok(loans
            .values()
            .find(|l| {
                l.status == LoanStatus::Active
                    && requests
                        .get(&l.borrow_request_id)
                        .is_some_and(|r| r.resource_id == resource_id)
            })
            .cloned())
    }

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), GearShareError> {
        self.group_audits
            .lock()
            .await
            .entry(audit.group_id.clone())
            .or_default()
            .push(audit);
        Ok(())
    }

    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, GearShareError> {
        Ok(self
            .group_audits
            .lock()
            .await
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }
}

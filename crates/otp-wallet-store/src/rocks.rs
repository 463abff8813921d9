//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use otp_wallet_core::otp::validate_purchase;
use otp_wallet_core::{
    BalanceRequest, BalanceRequestId, OtpRecord, RequestStatus, Session, SupportTicket,
    TicketId, TicketStatus, Transaction, TransactionId, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{Approval, OtpPurchase, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes read-check-write sequences on mutable records.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// The guard protects no data, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn put<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = Self::serialize(value)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Write a record and its per-user index entry in one batch.
    fn put_indexed<T: serde::Serialize>(
        &self,
        record_cf: &str,
        index_cf: &str,
        user_id: &UserId,
        id_bytes: [u8; 16],
        value: &T,
    ) -> Result<()> {
        let cf_record = self.cf(record_cf)?;
        let cf_index = self.cf(index_cf)?;
        let value = Self::serialize(value)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_record, keys::record_key(id_bytes), &value);
        batch.put_cf(&cf_index, keys::user_index_key(user_id, id_bytes), []); // Index entry (empty value)

        self.write(batch)
    }

    /// Collect the record ids under an index prefix, newest first.
    fn index_ids(&self, index_cf: &str, prefix: &[u8]) -> Result<Vec<[u8; 16]>> {
        let cf_index = self.cf(index_cf)?;
        let iter = self
            .db
            .iterator_cf(&cf_index, IteratorMode::From(prefix, Direction::Forward));

        // ULIDs are time-ordered, so forward iteration is oldest first
        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(prefix) {
                break;
            }

            if let Some(id) = keys::trailing_id(&key) {
                ids.push(id);
            }
        }

        ids.reverse();
        Ok(ids)
    }

    /// Load a user's records through an index, newest first.
    fn list_indexed<T: DeserializeOwned>(
        &self,
        record_cf: &str,
        index_cf: &str,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<T>> {
        let ids = self.index_ids(index_cf, &keys::user_prefix(user_id))?;

        let mut records = Vec::new();
        for id in ids.into_iter().skip(offset).take(limit) {
            if let Some(record) = self.get(record_cf, &keys::record_key(id))? {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Scan a whole column family from the last key backwards.
    fn scan_newest<T: DeserializeOwned>(
        &self,
        cf_name: &str,
        mut keep: impl FnMut(&T) -> bool,
    ) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let record: T = Self::deserialize(&value)?;
            if keep(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn require_user(&self, user_id: &UserId) -> Result<User> {
        self.get_user(user_id)?
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn create_user(&self, user: &User) -> Result<()> {
        let cf_users = self.cf(cf::USERS)?;
        let cf_usernames = self.cf(cf::USERNAMES)?;

        let user_key = keys::user_key(&user.id);
        let username_key = keys::username_key(&user.username);
        let value = Self::serialize(user)?;

        let _guard = self.lock();

        let taken = self
            .db
            .get_cf(&cf_usernames, &username_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if taken {
            return Err(StoreError::Duplicate {
                entity: "username",
                key: user.username.clone(),
            });
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_users, &user_key, &value);
        batch.put_cf(&cf_usernames, &username_key, &user_key);
        self.write(batch)?;

        tracing::debug!(user_id = %user.id, username = %user.username, "User created");
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        self.get(cf::USERS, &keys::user_key(user_id))
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let cf = self.cf(cf::USERNAMES)?;

        let Some(raw) = self
            .db
            .get_cf(&cf, keys::username_key(username))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let bytes: [u8; 16] = raw
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Database(format!("corrupt username index: {username}")))?;

        self.get_user(&UserId::from_bytes(bytes))
    }

    fn set_balance(&self, user_id: &UserId, balance_paise: i64) -> Result<User> {
        let _guard = self.lock();

        let mut user = self.require_user(user_id)?;
        user.balance_paise = balance_paise;
        user.updated_at = chrono::Utc::now();
        self.put(cf::USERS, &keys::user_key(user_id), &user)?;

        Ok(user)
    }

    fn set_admin(&self, user_id: &UserId, is_admin: bool) -> Result<User> {
        let _guard = self.lock();

        let mut user = self.require_user(user_id)?;
        user.is_admin = is_admin;
        user.updated_at = chrono::Utc::now();
        self.put(cf::USERS, &keys::user_key(user_id), &user)?;

        Ok(user)
    }

    fn list_admins(&self) -> Result<Vec<User>> {
        let mut admins = self.scan_newest(cf::USERS, |user: &User| user.is_admin)?;
        admins.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(admins)
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    fn put_session(&self, session: &Session) -> Result<()> {
        self.put(cf::SESSIONS, &keys::session_key(&session.token), session)
    }

    fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.get(cf::SESSIONS, &keys::session_key(token))
    }

    fn delete_session(&self, token: &str) -> Result<()> {
        let cf = self.cf(cf::SESSIONS)?;

        self.db
            .delete_cf(&cf, keys::session_key(token))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let cf = self.cf(cf::SESSIONS)?;

        let mut batch = WriteBatch::default();
        let mut purged = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let session: Session = Self::deserialize(&value)?;
            if session.is_expired_at(now) {
                batch.delete_cf(&cf, key);
                purged += 1;
            }
        }

        if purged > 0 {
            self.write(batch)?;
            tracing::debug!(purged, "Expired sessions purged");
        }

        Ok(purged)
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn put_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.put_indexed(
            cf::TRANSACTIONS,
            cf::TRANSACTIONS_BY_USER,
            &transaction.user_id,
            transaction.id.to_bytes(),
            transaction,
        )
    }

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        self.get(cf::TRANSACTIONS, &keys::record_key(transaction_id.to_bytes()))
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>> {
        self.list_indexed(
            cf::TRANSACTIONS,
            cf::TRANSACTIONS_BY_USER,
            user_id,
            limit,
            offset,
        )
    }

    // =========================================================================
    // Balance Request Operations
    // =========================================================================

    fn put_balance_request(&self, request: &BalanceRequest) -> Result<()> {
        self.put_indexed(
            cf::BALANCE_REQUESTS,
            cf::BALANCE_REQUESTS_BY_USER,
            &request.user_id,
            request.id.to_bytes(),
            request,
        )
    }

    fn get_balance_request(
        &self,
        request_id: &BalanceRequestId,
    ) -> Result<Option<BalanceRequest>> {
        self.get(cf::BALANCE_REQUESTS, &keys::record_key(request_id.to_bytes()))
    }

    fn list_balance_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<BalanceRequest>> {
        self.scan_newest(cf::BALANCE_REQUESTS, |request: &BalanceRequest| {
            status.map_or(true, |s| request.status == s)
        })
    }

    fn list_balance_requests_by_user(&self, user_id: &UserId) -> Result<Vec<BalanceRequest>> {
        self.list_indexed(
            cf::BALANCE_REQUESTS,
            cf::BALANCE_REQUESTS_BY_USER,
            user_id,
            usize::MAX,
            0,
        )
    }

    fn approve_balance_request(
        &self,
        request_id: &BalanceRequestId,
        admin_id: &UserId,
    ) -> Result<Approval> {
        let cf_requests = self.cf(cf::BALANCE_REQUESTS)?;
        let cf_users = self.cf(cf::USERS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let _guard = self.lock();

        let mut request = self
            .get_balance_request(request_id)?
            .ok_or_else(|| StoreError::not_found("balance request", request_id))?;
        request.approve(*admin_id)?;

        let mut user = self.require_user(&request.user_id)?;
        let balance_paise = user.credit(request.amount_paise)?;

        let transaction = Transaction::deposit(
            user.id,
            request.amount_paise,
            balance_paise,
            request.utr_number.clone(),
            request.id,
        );

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_requests,
            keys::record_key(request.id.to_bytes()),
            Self::serialize(&request)?,
        );
        batch.put_cf(&cf_users, keys::user_key(&user.id), Self::serialize(&user)?);
        batch.put_cf(
            &cf_tx,
            keys::record_key(transaction.id.to_bytes()),
            Self::serialize(&transaction)?,
        );
        batch.put_cf(
            &cf_tx_by_user,
            keys::user_index_key(&user.id, transaction.id.to_bytes()),
            [],
        );
        self.write(batch)?;

        tracing::debug!(
            request_id = %request.id,
            user_id = %user.id,
            amount_paise = request.amount_paise,
            balance_paise,
            "Balance request approved"
        );

        Ok(Approval {
            request,
            transaction,
            balance_paise,
        })
    }

    fn reject_balance_request(
        &self,
        request_id: &BalanceRequestId,
        admin_id: &UserId,
        reason: &str,
    ) -> Result<BalanceRequest> {
        let _guard = self.lock();

        let mut request = self
            .get_balance_request(request_id)?
            .ok_or_else(|| StoreError::not_found("balance request", request_id))?;
        request.reject(*admin_id, reason)?;

        self.put(
            cf::BALANCE_REQUESTS,
            &keys::record_key(request.id.to_bytes()),
            &request,
        )?;

        Ok(request)
    }

    // =========================================================================
    // OTP Operations
    // =========================================================================

    fn purchase_otp(
        &self,
        user_id: &UserId,
        app_name: &str,
        price_paise: i64,
    ) -> Result<OtpPurchase> {
        validate_purchase(app_name, price_paise)?;

        let cf_users = self.cf(cf::USERS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let cf_otps = self.cf(cf::OTPS)?;
        let cf_otps_by_app = self.cf(cf::OTPS_BY_USER_APP)?;

        let _guard = self.lock();

        let mut user = self.require_user(user_id)?;
        let balance_paise = user.debit(price_paise)?;

        let transaction = Transaction::otp_purchase(user.id, price_paise, balance_paise, app_name);
        let otp = OtpRecord::issue(user.id, app_name);

        // Write atomically
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_users, keys::user_key(&user.id), Self::serialize(&user)?);
        batch.put_cf(
            &cf_tx,
            keys::record_key(transaction.id.to_bytes()),
            Self::serialize(&transaction)?,
        );
        batch.put_cf(
            &cf_tx_by_user,
            keys::user_index_key(&user.id, transaction.id.to_bytes()),
            [],
        );
        batch.put_cf(
            &cf_otps,
            keys::record_key(otp.id.to_bytes()),
            Self::serialize(&otp)?,
        );
        batch.put_cf(
            &cf_otps_by_app,
            keys::otp_index_key(&user.id, app_name, otp.id.to_bytes()),
            [],
        );
        self.write(batch)?;

        tracing::debug!(
            user_id = %user.id,
            app_name,
            price_paise,
            balance_paise,
            "OTP purchased"
        );

        Ok(OtpPurchase {
            otp,
            transaction,
            balance_paise,
        })
    }

    fn latest_otp(&self, user_id: &UserId, app_name: &str) -> Result<Option<OtpRecord>> {
        let cf_index = self.cf(cf::OTPS_BY_USER_APP)?;
        let prefix = keys::otp_app_prefix(user_id, app_name);

        // Seek to the last possible key under the prefix and walk backwards
        let mut upper = prefix.clone();
        upper.extend_from_slice(&[0xFF; 16]);

        let iter = self
            .db
            .iterator_cf(&cf_index, IteratorMode::From(&upper, Direction::Reverse));

        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let Some(id) = keys::trailing_id(&key) else {
                continue;
            };
            let record: Option<OtpRecord> = self.get(cf::OTPS, &keys::record_key(id))?;
            if let Some(otp) = record.filter(|otp| !otp.is_used) {
                return Ok(Some(otp));
            }
        }

        Ok(None)
    }

    fn list_otps_by_user(&self, user_id: &UserId) -> Result<Vec<OtpRecord>> {
        // The per-app index is grouped by app name, so sort by id afterwards
        let mut otps: Vec<OtpRecord> = Vec::new();
        for id in self.index_ids(cf::OTPS_BY_USER_APP, &keys::user_prefix(user_id))? {
            if let Some(otp) = self.get(cf::OTPS, &keys::record_key(id))? {
                otps.push(otp);
            }
        }

        otps.sort_by(|a: &OtpRecord, b: &OtpRecord| b.id.cmp(&a.id));
        Ok(otps)
    }

    // =========================================================================
    // Support Ticket Operations
    // =========================================================================

    fn put_ticket(&self, ticket: &SupportTicket) -> Result<()> {
        self.put_indexed(
            cf::SUPPORT_TICKETS,
            cf::SUPPORT_TICKETS_BY_USER,
            &ticket.user_id,
            ticket.id.to_bytes(),
            ticket,
        )
    }

    fn get_ticket(&self, ticket_id: &TicketId) -> Result<Option<SupportTicket>> {
        self.get(cf::SUPPORT_TICKETS, &keys::record_key(ticket_id.to_bytes()))
    }

    fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<SupportTicket>> {
        self.scan_newest(cf::SUPPORT_TICKETS, |ticket: &SupportTicket| {
            status.map_or(true, |s| ticket.status == s)
        })
    }

    fn list_tickets_by_user(&self, user_id: &UserId) -> Result<Vec<SupportTicket>> {
        self.list_indexed(
            cf::SUPPORT_TICKETS,
            cf::SUPPORT_TICKETS_BY_USER,
            user_id,
            usize::MAX,
            0,
        )
    }

    fn respond_to_ticket(
        &self,
        ticket_id: &TicketId,
        admin_id: &UserId,
        response: &str,
    ) -> Result<SupportTicket> {
        let _guard = self.lock();

        let mut ticket = self
            .get_ticket(ticket_id)?
            .ok_or_else(|| StoreError::not_found("support ticket", ticket_id))?;
        ticket.respond(*admin_id, response)?;

        self.put(
            cf::SUPPORT_TICKETS,
            &keys::record_key(ticket.id.to_bytes()),
            &ticket,
        )?;

        Ok(ticket)
    }
}

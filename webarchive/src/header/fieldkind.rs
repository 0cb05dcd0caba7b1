use std::fmt;

use crate::FieldName;

/// Standardized values for [field names](FieldName).
///
/// Besides the fields defined by the WARC standard, this includes the names under which ARC-only
/// metadata is exposed so records of either format present the same field shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `WARC-Record-ID`: a globally unique identifier for a record.
    ///
    /// This field is mandatory and must be present in a standards-compliant record.
    /// Values should consist of a URI delimited by angle brackets: `"<" uri ">"`. Often
    /// the URI describes a UUID consistent with [RFC 4122](https://dx.doi.org/10.17487/rfc4122),
    /// such as `urn:uuid:f81d4fae-7dec-11d0-a765-00a0c91e6bf6`.
    RecordId,
    /// `Content-Length`: The number of octets (bytes) in a record block.
    ///
    /// This field is mandatory and must be present in a standards-compliant record.
    /// Values should consist of one or more [ASCII](https://dx.doi.org/10.17487/rfc0020) digits.
    /// For ARC entries this holds the `Archive-length` value.
    ContentLength,
    /// `WARC-Date`: the instant that record data capture of a record began.
    ///
    /// This must be a UTC timestamp according to the W3C profile of ISO 8601,
    /// such as `YYYY-MM-DDThh:mm:ssZ`. ARC entries carry their 14-digit `Archive-date` here.
    Date,
    /// `WARC-Type`: the type of a record, corresponding to a [`RecordType`](crate::RecordType).
    ///
    /// This field is mandatory and must be present in a standards-compliant record.
    Type,
    /// `Content-Type`: the [RFC 2045](https://dx.doi.org/10.17487/rfc2045) MIME type
    /// of a record's data block.
    ContentType,
    /// `WARC-Concurrent-To`: the [`RecordId`](Self::RecordId) of any records created as part of
    /// the same capture event as a record.
    ///
    /// This field may appear multiple times on a single record.
    ConcurrentTo,
    /// `WARC-Block-Digest`: a `labelled-digest` of a complete record block.
    ///
    /// A `labelled-digest` has the form `algorithm ":" digest-value`, typically
    /// `sha1:` followed by an RFC 4648 base32 digest.
    BlockDigest,
    /// `WARC-Payload-Digest`: a `labelled-digest` of a record's payload, in the same format as a
    /// [`BlockDigest`](crate::FieldKind::BlockDigest) value.
    ///
    /// The payload of a block with [`ContentType`](FieldKind::ContentType) `application/http` is the
    /// HTTP entity body, excluding any headers.
    PayloadDigest,
    /// `WARC-IP-Address`: an IP address that was contacted to retrieve record content.
    IpAddress,
    /// `WARC-Refers-To`: the record ID of a single record for which the present record
    /// holds additional content.
    RefersTo,
    /// `WARC-Refers-To-Target-URI`: the [`TargetURI`](Self::TargetURI) of the record referred to by
    /// [`RefersTo`](Self::RefersTo).
    RefersToTargetURI,
    /// `WARC-Refers-To-Date`: the [`Date`](Self::Date) of the record referred to by
    /// [`RefersTo`](Self::RefersTo).
    RefersToDate,
    /// `WARC-Target-URI`: the original URI that provided the record content.
    ///
    /// In the context of web crawling, this is the URI that a crawler sent a request to retrieve.
    TargetURI,
    /// `WARC-Truncated`: the reason that a record contains a truncated version of the
    /// original resource.
    Truncated,
    /// `WARC-Warcinfo-ID`: the [ID](Self::RecordId) of the [warcinfo](crate::RecordKind::Info)
    /// record associated with this record.
    InfoID,
    /// `WARC-Filename`: the name of the file containing the current
    /// [warcinfo](crate::RecordKind::Info) record.
    Filename,
    /// `WARC-Profile`: the kind of analysis and handling applied to create a
    /// [revisit](crate::RecordKind::Revisit) record, specified as a URI.
    Profile,
    /// `WARC-Identified-Payload-Type`: the content-type discovered by inspecting a record payload.
    IdentifiedPayloadType,
    /// `WARC-Segment-Number`: the current record's ordering in a sequence of segmented records.
    ///
    /// This field is required for [continuation](crate::RecordKind::Continuation) records as well as for
    /// any record that has associated continuations. In the first record its value is `1`, and
    /// for subsequent continuations the value is incremented.
    SegmentNumber,
    /// `WARC-Segment-Origin-ID`: the ID of the starting record in a series of segmented records.
    SegmentOriginID,
    /// `WARC-Segment-Total-Length`: the total length of concatenated segmented content blocks.
    ///
    /// This field is required for the last [continuation](crate::RecordKind::Continuation) record
    /// of a series, and *shall not* be used elsewhere.
    SegmentTotalLength,
    /// `ARC-Result-Code`: the protocol response code of an ARC version 2 entry.
    ArcResultCode,
    /// `ARC-Checksum`: the checksum column of an ARC version 2 entry.
    ArcChecksum,
    /// `ARC-Location`: the redirect location column of an ARC version 2 entry.
    ArcLocation,
    /// `ARC-Offset`: the file offset column of an ARC version 2 entry.
    ArcOffset,
    /// `ARC-Filename`: the file name column of an ARC version 2 entry.
    ArcFilename,
}

impl FieldKind {
    pub fn into_name(self) -> FieldName {
        FieldName::Known(self)
    }
}

include!(concat!(env!("OUT_DIR"), "/field_kind_conversions.rs"));

impl PartialEq<FieldName> for FieldKind {
    fn eq(&self, other: &FieldName) -> bool {
        other == self
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
